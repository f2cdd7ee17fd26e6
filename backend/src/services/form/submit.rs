//! Form submission processing.
//!
//! Answers arrive keyed by free-text question titles, so fields are
//! extracted with an ordered rule table over normalized (lowercased,
//! accent-folded) keys. The first rule a key matches fills the field, and
//! a field once filled is never overwritten. Uploaded files are recognized
//! either as bare store ids or as URLs into the file store, and are moved
//! into the folder named by the folder-name answer.
//!
//! A submission without a folder answer is not an error: it is logged and
//! ignored, since the form can also be filled outside the workflow.

use crate::config::{Config, DriveConfig};
use crate::drive;
use crate::errors::CxError;
use crate::job_controller::state::{JobUpdate, JobsState};
use actix_web::{web, HttpResponse, Responder};
use common::jobs::{JobStatus, ResultadoFlujo};
use common::model::envio::EnvioFormulario;
use log::{info, warn};
use regex::Regex;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Answer fields the ingester cares about, in rule order.
#[derive(Debug, Default)]
pub struct Respuestas {
    pub paciente: Option<String>,
    pub fecha_cx: Option<String>,
    pub hora_cx: Option<String>,
    pub institucion: Option<String>,
    pub medico: Option<String>,
    pub material: Option<String>,
    pub nombre_carpeta: Option<String>,
    pub id_carpeta: Option<String>,
}

/// The Actix handler for `POST /api/form/submit`.
///
/// Schedules the ingest as a background job and returns its `job_id`.
pub(crate) async fn process(
    cfg: web::Data<Config>,
    state: web::Data<JobsState>,
    payload: web::Json<EnvioFormulario>,
) -> impl Responder {
    let job_id = Uuid::new_v4().to_string();
    state
        .jobs
        .write()
        .await
        .insert(job_id.clone(), JobStatus::Pending);

    let tx = state.tx.clone();
    let job_id_clone = job_id.clone();
    let cfg = cfg.get_ref().clone();
    let envio = payload.into_inner();

    tokio::spawn(async move {
        let handle = tokio::task::spawn_blocking(move || procesar_envio(&cfg, envio));
        let status = match handle.await {
            Ok(Ok(movidos)) => JobStatus::Completed(ResultadoFlujo {
                detalle: format!("{} archivo(s) movidos", movidos),
                ..ResultadoFlujo::default()
            }),
            Ok(Err(e)) => JobStatus::Failed(e.to_string()),
            Err(e) => JobStatus::Failed(format!("Task join error: {}", e)),
        };
        let _ = tx
            .send(JobUpdate {
                job_id: job_id_clone,
                status,
            })
            .await;
    });

    HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id }))
}

/// Lowercases and folds the Spanish accented letters, so rule predicates
/// only ever see plain ASCII keys.
fn normalizar_clave(clave: &str) -> String {
    clave
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            'ü' => 'u',
            'ñ' => 'n',
            otro => otro,
        })
        .collect()
}

/// Exact-token match: "médico" the question, never the "m...dico" inside
/// another word.
fn es_pregunta_medico(clave: &str) -> bool {
    clave
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| token == "medico")
}

/// Extracts the known fields from the normalized answers.
///
/// Rules run in a fixed order per key; the folder rule comes first so an
/// "ID de carpeta" question never leaks into another field. A filled
/// field is never overwritten by a later key.
pub fn extraer_respuestas(valores: &BTreeMap<String, Vec<String>>) -> Respuestas {
    type Regla = (fn(&str) -> bool, fn(&mut Respuestas, &str));

    let reglas: [Regla; 7] = [
        (
            |c| c.contains("id") && c.contains("carpeta"),
            |r, v| {
                r.nombre_carpeta.get_or_insert_with(|| v.to_string());
                r.id_carpeta.get_or_insert_with(|| v.to_string());
            },
        ),
        (
            |c| c.contains("paciente"),
            |r, v| {
                r.paciente.get_or_insert_with(|| v.to_string());
            },
        ),
        (
            |c| c.contains("fecha") && c.contains("cirug"),
            |r, v| {
                r.fecha_cx.get_or_insert_with(|| v.to_string());
            },
        ),
        (
            |c| c.contains("hora"),
            |r, v| {
                r.hora_cx.get_or_insert_with(|| v.to_string());
            },
        ),
        (
            |c| c.contains("instituci"),
            |r, v| {
                r.institucion.get_or_insert_with(|| v.to_string());
            },
        ),
        (
            es_pregunta_medico,
            |r, v| {
                r.medico.get_or_insert_with(|| v.to_string());
            },
        ),
        (
            |c| c.contains("material"),
            |r, v| {
                r.material.get_or_insert_with(|| v.to_string());
            },
        ),
    ];

    let mut respuestas = Respuestas::default();
    for (clave, valores_pregunta) in valores {
        let Some(valor) = valores_pregunta.first() else {
            continue;
        };
        if valor.trim().is_empty() {
            continue;
        }
        let clave = normalizar_clave(clave);
        for (predicado, asignar) in &reglas {
            if predicado(&clave) {
                asignar(&mut respuestas, valor.trim());
                break;
            }
        }
    }
    respuestas
}

/// Recognizes uploaded-file references among all answers.
///
/// A bare token of 20 to 100 characters without scheme, slash or space is
/// taken as a store id directly; otherwise a URL pointing into this store
/// has its id extracted from the query or the `/d/{id}/` path segment.
pub fn extraer_archivos(cfg: &DriveConfig, valores: &BTreeMap<String, Vec<String>>) -> Vec<String> {
    let mut ids = Vec::new();
    for respuesta in valores.values().flatten() {
        let respuesta = respuesta.trim();
        if (20..=100).contains(&respuesta.len())
            && !respuesta.contains("http")
            && !respuesta.contains('/')
            && !respuesta.contains(' ')
        {
            ids.push(respuesta.to_string());
        } else if respuesta.contains(&cfg.marcador_host) {
            if let Some(id) = id_desde_url(respuesta) {
                ids.push(id);
            }
        }
    }
    ids
}

fn id_desde_url(url: &str) -> Option<String> {
    let por_query = Regex::new(r"id=([^&]+)").ok()?;
    if let Some(cap) = por_query.captures(url) {
        return Some(cap[1].to_string());
    }
    let por_ruta = Regex::new(r"/d/([^/]+)").ok()?;
    por_ruta.captures(url).map(|cap| cap[1].to_string())
}

/// Processes one submission end to end. Returns the number of files moved.
pub fn procesar_envio(cfg: &Config, envio: EnvioFormulario) -> Result<usize, CxError> {
    let valores = envio.normalizar();
    let respuestas = extraer_respuestas(&valores);

    let Some(nombre_carpeta) = respuestas.nombre_carpeta else {
        warn!("Envío de formulario sin respuesta de carpeta; se ignora");
        return Ok(0);
    };

    let archivos = extraer_archivos(&cfg.drive, &valores);
    if archivos.is_empty() {
        info!("Envío para \"{}\" sin archivos adjuntos", nombre_carpeta);
        return Ok(0);
    }

    mover_archivos_a_carpeta(&cfg.drive, &nombre_carpeta, &archivos)
}

/// Moves each uploaded file into the folder named by the submission:
/// rename with the project-id prefix, attach to the destination, then
/// detach from every other parent. A file that fails is logged and
/// skipped; the rest still move.
pub fn mover_archivos_a_carpeta(
    cfg: &DriveConfig,
    nombre_carpeta: &str,
    archivos: &[String],
) -> Result<usize, CxError> {
    let carpeta = drive::buscar_carpeta_por_nombre(cfg, nombre_carpeta)?
        .ok_or_else(|| CxError::CarpetaNoEncontrada(nombre_carpeta.to_string()))?;

    // "{id_proyecto} - {paciente}" -> prefix the files with the project id.
    let id_proyecto = nombre_carpeta
        .split(" - ")
        .next()
        .unwrap_or(nombre_carpeta)
        .trim();

    let mut movidos = 0;
    for archivo_id in archivos {
        match mover_un_archivo(cfg, archivo_id, &carpeta.id, id_proyecto) {
            Ok(()) => movidos += 1,
            Err(e) => warn!("No se pudo mover el archivo {}: {}", archivo_id, e),
        }
    }
    info!(
        "{} de {} archivo(s) movidos a \"{}\"",
        movidos,
        archivos.len(),
        nombre_carpeta
    );
    Ok(movidos)
}

fn mover_un_archivo(
    cfg: &DriveConfig,
    archivo_id: &str,
    carpeta_id: &str,
    id_proyecto: &str,
) -> Result<(), CxError> {
    let nombre = drive::nombre_archivo(cfg, archivo_id)?;
    drive::renombrar_archivo(cfg, archivo_id, &format!("{} - {}", id_proyecto, nombre))?;
    drive::agregar_a_carpeta(cfg, archivo_id, carpeta_id)?;
    drive::quitar_de_otros_padres(cfg, archivo_id, carpeta_id)?;
    Ok(())
}
