//! Local folder/file store with the external suite's semantics.
//!
//! A SQLite catalog (`carpetas`, `archivos`, `archivo_padres`) plus a blob
//! directory. The properties the pipeline depends on are first-class here:
//! duplicate folder names are permitted, files can belong to several
//! parent folders at once (a "move" is add-then-remove, not atomic),
//! trashing is a flag, and every object is addressed by an opaque
//! alphanumeric identifier.

use crate::config::DriveConfig;
use crate::errors::CxError;
use md5::Context;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Carpeta {
    pub id: String,
    pub nombre: String,
}

#[derive(Debug, Clone)]
pub struct Archivo {
    pub id: String,
    pub nombre: String,
}

/// New opaque identifier: 32 alphanumeric chars, no slashes or spaces.
pub fn nuevo_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn abrir(cfg: &DriveConfig) -> Result<Connection, CxError> {
    Ok(Connection::open(cfg.db_path())?)
}

/// Creates directories and schema, and seeds the fixed containers: the
/// parent folder, the uploads folder, and the template document (copied
/// from `plantilla_origen` when present; when absent, rendering simply
/// fails at its first use).
pub fn init(cfg: &DriveConfig) -> Result<(), CxError> {
    fs::create_dir_all(cfg.blobs_dir())?;
    let conn = abrir(cfg)?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS carpetas (
             id     TEXT PRIMARY KEY,
             nombre TEXT NOT NULL,
             padre  TEXT
         );
         CREATE TABLE IF NOT EXISTS archivos (
             id       TEXT PRIMARY KEY,
             nombre   TEXT NOT NULL,
             md5      TEXT,
             papelera INTEGER NOT NULL DEFAULT 0
         );
         CREATE TABLE IF NOT EXISTS archivo_padres (
             archivo_id TEXT NOT NULL,
             carpeta_id TEXT NOT NULL,
             PRIMARY KEY (archivo_id, carpeta_id)
         );",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO carpetas (id, nombre, padre) VALUES (?1, ?2, NULL)",
        params![cfg.carpeta_padre_id, "Asistencia Técnica CX"],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO carpetas (id, nombre, padre) VALUES (?1, ?2, ?3)",
        params![
            cfg.carpeta_cargas_id,
            "Cargas Formulario",
            cfg.carpeta_padre_id
        ],
    )?;

    let plantilla_registrada: Option<String> = conn
        .query_row(
            "SELECT id FROM archivos WHERE id = ?1",
            params![cfg.plantilla_doc_id],
            |row| row.get(0),
        )
        .optional()?;
    if plantilla_registrada.is_none() && cfg.plantilla_origen.exists() {
        let bytes = fs::read(&cfg.plantilla_origen)?;
        fs::write(cfg.blobs_dir().join(&cfg.plantilla_doc_id), &bytes)?;
        conn.execute(
            "INSERT INTO archivos (id, nombre, md5) VALUES (?1, ?2, ?3)",
            params![cfg.plantilla_doc_id, "Plantilla Resumen CX", md5_de(&bytes)],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO archivo_padres (archivo_id, carpeta_id) VALUES (?1, ?2)",
            params![cfg.plantilla_doc_id, cfg.carpeta_padre_id],
        )?;
    }
    Ok(())
}

fn md5_de(bytes: &[u8]) -> String {
    let mut hasher = Context::new();
    hasher.consume(bytes);
    format!("{:x}", hasher.finalize())
}

/// Creates a folder under the fixed parent container. Never checks for
/// name collisions: the store permits duplicate names, so each call
/// always inserts a new folder.
pub fn crear_carpeta(cfg: &DriveConfig, nombre: &str) -> Result<Carpeta, CxError> {
    let conn = abrir(cfg)?;
    let padre: Option<String> = conn
        .query_row(
            "SELECT id FROM carpetas WHERE id = ?1",
            params![cfg.carpeta_padre_id],
            |row| row.get(0),
        )
        .optional()?;
    if padre.is_none() {
        return Err(CxError::Aprovisionamiento(format!(
            "la carpeta padre \"{}\" no existe",
            cfg.carpeta_padre_id
        )));
    }

    let id = nuevo_id();
    conn.execute(
        "INSERT INTO carpetas (id, nombre, padre) VALUES (?1, ?2, ?3)",
        params![id, nombre, cfg.carpeta_padre_id],
    )?;
    Ok(Carpeta {
        id,
        nombre: nombre.to_string(),
    })
}

/// Folder for one surgery: `"{id_proyecto} - {paciente}"`.
pub fn crear_carpeta_cx(
    cfg: &DriveConfig,
    id_proyecto: &str,
    paciente: &str,
) -> Result<Carpeta, CxError> {
    crear_carpeta(cfg, &format!("{} - {}", id_proyecto, paciente))
}

/// Exact-name lookup among the children of the parent container. Returns
/// the first match; duplicates beyond that are not disambiguated.
pub fn buscar_carpeta_por_nombre(
    cfg: &DriveConfig,
    nombre: &str,
) -> Result<Option<Carpeta>, CxError> {
    let conn = abrir(cfg)?;
    let carpeta = conn
        .query_row(
            "SELECT id, nombre FROM carpetas
             WHERE padre = ?1 AND nombre = ?2
             ORDER BY rowid LIMIT 1",
            params![cfg.carpeta_padre_id, nombre],
            |row| {
                Ok(Carpeta {
                    id: row.get(0)?,
                    nombre: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(carpeta)
}

/// Duplicates an existing file (the template document) into a folder
/// under a new name, copying its bytes.
pub fn copiar_archivo(
    cfg: &DriveConfig,
    archivo_id: &str,
    carpeta_id: &str,
    nombre: &str,
) -> Result<Archivo, CxError> {
    let conn = abrir(cfg)?;
    let existe: Option<String> = conn
        .query_row(
            "SELECT id FROM archivos WHERE id = ?1",
            params![archivo_id],
            |row| row.get(0),
        )
        .optional()?;
    if existe.is_none() {
        return Err(CxError::ArchivoNoEncontrado(archivo_id.to_string()));
    }

    let bytes = fs::read(cfg.blobs_dir().join(archivo_id))?;
    let id = nuevo_id();
    fs::write(cfg.blobs_dir().join(&id), &bytes)?;
    conn.execute(
        "INSERT INTO archivos (id, nombre, md5) VALUES (?1, ?2, ?3)",
        params![id, nombre, md5_de(&bytes)],
    )?;
    conn.execute(
        "INSERT INTO archivo_padres (archivo_id, carpeta_id) VALUES (?1, ?2)",
        params![id, carpeta_id],
    )?;
    Ok(Archivo {
        id,
        nombre: nombre.to_string(),
    })
}

/// Registers a new file with the given bytes inside a folder.
pub fn crear_archivo(
    cfg: &DriveConfig,
    carpeta_id: &str,
    nombre: &str,
    bytes: &[u8],
) -> Result<Archivo, CxError> {
    let id = nuevo_id();
    fs::write(cfg.blobs_dir().join(&id), bytes)?;
    let conn = abrir(cfg)?;
    conn.execute(
        "INSERT INTO archivos (id, nombre, md5) VALUES (?1, ?2, ?3)",
        params![id, nombre, md5_de(bytes)],
    )?;
    conn.execute(
        "INSERT INTO archivo_padres (archivo_id, carpeta_id) VALUES (?1, ?2)",
        params![id, carpeta_id],
    )?;
    Ok(Archivo {
        id,
        nombre: nombre.to_string(),
    })
}

pub fn leer_blob(cfg: &DriveConfig, archivo_id: &str) -> Result<Vec<u8>, CxError> {
    fs::read(cfg.blobs_dir().join(archivo_id))
        .map_err(|_| CxError::ArchivoNoEncontrado(archivo_id.to_string()))
}

pub fn escribir_blob(cfg: &DriveConfig, archivo_id: &str, bytes: &[u8]) -> Result<(), CxError> {
    Ok(fs::write(cfg.blobs_dir().join(archivo_id), bytes)?)
}

pub fn nombre_archivo(cfg: &DriveConfig, archivo_id: &str) -> Result<String, CxError> {
    let conn = abrir(cfg)?;
    conn.query_row(
        "SELECT nombre FROM archivos WHERE id = ?1",
        params![archivo_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| CxError::ArchivoNoEncontrado(archivo_id.to_string()))
}

pub fn renombrar_archivo(
    cfg: &DriveConfig,
    archivo_id: &str,
    nombre: &str,
) -> Result<(), CxError> {
    let conn = abrir(cfg)?;
    let cambiados = conn.execute(
        "UPDATE archivos SET nombre = ?1 WHERE id = ?2",
        params![nombre, archivo_id],
    )?;
    if cambiados == 0 {
        return Err(CxError::ArchivoNoEncontrado(archivo_id.to_string()));
    }
    Ok(())
}

pub fn agregar_a_carpeta(
    cfg: &DriveConfig,
    archivo_id: &str,
    carpeta_id: &str,
) -> Result<(), CxError> {
    let conn = abrir(cfg)?;
    conn.execute(
        "INSERT OR IGNORE INTO archivo_padres (archivo_id, carpeta_id) VALUES (?1, ?2)",
        params![archivo_id, carpeta_id],
    )?;
    Ok(())
}

/// Second half of a move: drop every parent except the destination.
pub fn quitar_de_otros_padres(
    cfg: &DriveConfig,
    archivo_id: &str,
    carpeta_id: &str,
) -> Result<(), CxError> {
    let conn = abrir(cfg)?;
    conn.execute(
        "DELETE FROM archivo_padres WHERE archivo_id = ?1 AND carpeta_id != ?2",
        params![archivo_id, carpeta_id],
    )?;
    Ok(())
}

pub fn padres_de(cfg: &DriveConfig, archivo_id: &str) -> Result<Vec<String>, CxError> {
    let conn = abrir(cfg)?;
    let mut stmt =
        conn.prepare("SELECT carpeta_id FROM archivo_padres WHERE archivo_id = ?1")?;
    let padres = stmt
        .query_map(params![archivo_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(padres)
}

/// Trashing keeps the row and its parents; it only flags the file.
pub fn mover_a_papelera(cfg: &DriveConfig, archivo_id: &str) -> Result<(), CxError> {
    let conn = abrir(cfg)?;
    let cambiados = conn.execute(
        "UPDATE archivos SET papelera = 1 WHERE id = ?1",
        params![archivo_id],
    )?;
    if cambiados == 0 {
        return Err(CxError::ArchivoNoEncontrado(archivo_id.to_string()));
    }
    Ok(())
}

pub fn esta_en_papelera(cfg: &DriveConfig, archivo_id: &str) -> Result<bool, CxError> {
    let conn = abrir(cfg)?;
    conn.query_row(
        "SELECT papelera FROM archivos WHERE id = ?1",
        params![archivo_id],
        |row| row.get::<_, i32>(0),
    )
    .optional()?
    .map(|marca| marca != 0)
    .ok_or_else(|| CxError::ArchivoNoEncontrado(archivo_id.to_string()))
}

pub fn url_archivo(cfg: &DriveConfig, archivo_id: &str) -> String {
    format!("{}/d/{}/view", cfg.url_base, archivo_id)
}

pub fn url_carpeta(cfg: &DriveConfig, carpeta_id: &str) -> String {
    format!("{}/carpeta/{}", cfg.url_base, carpeta_id)
}
