//! Centralized, immutable configuration for the surgery-assistance service.
//!
//! One `Config` value is deserialized from a JSON file at startup (or built
//! from defaults when the file is absent) and injected by reference into
//! every service. Nothing reads ambient global state; any misconfigured
//! identifier only surfaces at its first use, as the external stores give
//! no earlier way to detect it.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub drive: DriveConfig,
    pub form: FormConfig,
    pub sheets: SheetsConfig,
    pub formatos: Formatos,
    pub acortador: AcortadorConfig,
    /// Named time zone the agenda is maintained in (display locale).
    pub timezone: String,
    /// Directory holding the TTF families used for PDF export.
    pub fuentes: PathBuf,
}

impl Config {
    /// Loads the configuration from `ruta`, falling back to defaults when
    /// the file does not exist.
    pub fn cargar(ruta: &Path) -> Result<Config, String> {
        if !ruta.exists() {
            return Ok(Config::default());
        }
        let texto = std::fs::read_to_string(ruta)
            .map_err(|e| format!("No se pudo leer {}: {}", ruta.display(), e))?;
        serde_json::from_str(&texto)
            .map_err(|e| format!("Configuración inválida en {}: {}", ruta.display(), e))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub puerto: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            puerto: 8080,
        }
    }
}

/// Folder/file store settings. The store itself is a SQLite catalog plus a
/// blob directory under `raiz`; the identifiers below are opaque keys into
/// that catalog, exactly like the external suite's folder and document ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub raiz: PathBuf,
    /// Fixed parent container that owns every per-surgery folder.
    pub carpeta_padre_id: String,
    /// Folder that receives raw form uploads before relocation.
    pub carpeta_cargas_id: String,
    /// Template document the summary is rendered from.
    pub plantilla_doc_id: String,
    /// Seed file registered as the template document on first start.
    pub plantilla_origen: PathBuf,
    /// Public base under which stored files are served.
    pub url_base: String,
    /// Substring that marks a URL as pointing into this store.
    pub marcador_host: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        DriveConfig {
            raiz: PathBuf::from("./datos/drive"),
            carpeta_padre_id: "carpeta-padre-asistencia".to_string(),
            carpeta_cargas_id: "carpeta-cargas-formulario".to_string(),
            plantilla_doc_id: "plantilla-resumen-cx".to_string(),
            plantilla_origen: PathBuf::from("./plantillas/resumen_cx.txt"),
            url_base: "http://127.0.0.1:8080/api/archivos".to_string(),
            marcador_host: "/api/archivos".to_string(),
        }
    }
}

impl DriveConfig {
    pub fn db_path(&self) -> PathBuf {
        self.raiz.join("drive.sqlite")
    }

    pub fn blobs_dir(&self) -> PathBuf {
        self.raiz.join("blobs")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub id: String,
    pub url_base: String,
    pub entries: Entries,
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig {
            id: "1xOkS21hHbzLuTCHvMkCGWACjkpekpK7Rovt1lxQmv3s".to_string(),
            url_base: "https://docs.google.com/forms/d/".to_string(),
            entries: Entries::default(),
        }
    }
}

/// Field identifiers owned by the external form's schema. Opaque constants;
/// the order they are emitted in is fixed by the link builder, not here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Entries {
    pub paciente: String,
    pub fecha_cx: String,
    pub hora_cx: String,
    pub institucion: String,
    pub medico: String,
    pub material: String,
    /// Visible folder-name field.
    pub folder_name: String,
    /// Hidden folder-id field.
    pub folder_id: String,
}

impl Default for Entries {
    fn default() -> Self {
        Entries {
            paciente: "entry.12800784".to_string(),
            fecha_cx: "entry.890765022".to_string(),
            hora_cx: "entry.1997407525".to_string(),
            institucion: "entry.1716314446".to_string(),
            medico: "entry.457663501".to_string(),
            material: "entry.1052872094".to_string(),
            folder_name: "entry.702791237".to_string(),
            folder_id: "entry.2111057105".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Directory holding one CSV per agenda sheet.
    pub dir: PathBuf,
    pub hoja_links: String,
    pub columnas: Columnas,
    pub estados: Estados,
    pub colores: Colores,
    pub protecciones: Vec<Proteccion>,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        SheetsConfig {
            dir: PathBuf::from("./datos/hojas"),
            hoja_links: "Links_AsistenciaTecnica".to_string(),
            columnas: Columnas::default(),
            estados: Estados::default(),
            colores: Colores::default(),
            protecciones: Vec::new(),
        }
    }
}

/// Positional column map of the agenda sheets (1-based). Reordering the
/// sheet means updating this map, never the mapping logic.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Columnas {
    pub fecha_cx: usize,
    pub estado: usize,
    pub id_proyecto: usize,
    pub paciente: usize,
    pub institucion: usize,
    pub hora_cx: usize,
    pub medico: usize,
    pub cliente: usize,
    pub material: usize,
}

impl Default for Columnas {
    fn default() -> Self {
        Columnas {
            fecha_cx: 1,    // A
            estado: 2,      // B
            id_proyecto: 3, // C
            paciente: 4,    // D
            institucion: 5, // E
            hora_cx: 6,     // F
            medico: 7,      // G
            cliente: 8,     // H
            material: 18,   // R
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Estados {
    pub autorizada: String,
}

impl Default for Estados {
    fn default() -> Self {
        Estados {
            autorizada: "AUTORIZADA".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Colores {
    pub autorizada: String,
}

impl Default for Colores {
    fn default() -> Self {
        Colores {
            autorizada: "#d9ead3".to_string(),
        }
    }
}

/// A protected rectangle of an agenda sheet. Only the listed editors may
/// write cells inside it; everyone may write outside any protection.
#[derive(Debug, Clone, Deserialize)]
pub struct Proteccion {
    pub hoja: String,
    pub fila_desde: usize,
    pub fila_hasta: usize,
    pub columna_desde: usize,
    pub columna_hasta: usize,
    pub editores: Vec<String>,
}

impl Proteccion {
    pub fn cubre(&self, hoja: &str, fila: usize, columna: usize) -> bool {
        self.hoja == hoja
            && self.fila_desde <= fila
            && fila <= self.fila_hasta
            && self.columna_desde <= columna
            && columna <= self.columna_hasta
    }

    pub fn puede_editar(&self, usuario: Option<&str>) -> bool {
        match usuario {
            Some(u) => self.editores.iter().any(|e| e == u),
            None => false,
        }
    }
}

/// chrono format patterns for display and machine rendering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Formatos {
    pub fecha_arg: String,
    pub fecha_form: String,
    pub fecha_filename: String,
    pub hora: String,
}

impl Default for Formatos {
    fn default() -> Self {
        Formatos {
            fecha_arg: "%d/%m/%Y".to_string(),
            fecha_form: "%Y-%m-%d".to_string(),
            fecha_filename: "%Y-%m-%d".to_string(),
            hora: "%H:%M".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AcortadorConfig {
    /// When enabled, the form link is shortened before it is logged.
    pub habilitado: bool,
    /// Preferred service; the other acts as fallback.
    pub servicio: String,
}

impl Default for AcortadorConfig {
    fn default() -> Self {
        AcortadorConfig {
            habilitado: false,
            servicio: "tinyurl".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            drive: DriveConfig::default(),
            form: FormConfig::default(),
            sheets: SheetsConfig::default(),
            formatos: Formatos::default(),
            acortador: AcortadorConfig::default(),
            timezone: "America/Argentina/Buenos_Aires".to_string(),
            fuentes: PathBuf::from("./fonts"),
        }
    }
}
