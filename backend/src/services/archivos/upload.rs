//! Multipart upload into the file store.
//!
//! Every `file` part lands in the form-uploads folder under a fresh store
//! id; the response carries the ids and URLs the form answers then refer
//! to.

use crate::config::Config;
use crate::drive;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use futures_util::StreamExt;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ArchivoSubido {
    pub id: String,
    pub nombre: String,
    pub url: String,
}

/// HTTP handler wrapper that converts the internal result to an
/// `HttpResponse`.
pub(crate) async fn process(cfg: web::Data<Config>, payload: Multipart) -> impl Responder {
    match subir_archivos(&cfg, payload).await {
        Ok(subidos) => HttpResponse::Ok().json(subidos),
        Err(e) => HttpResponse::BadRequest().body(format!("Error: {}", e)),
    }
}

async fn subir_archivos(
    cfg: &Config,
    mut payload: Multipart,
) -> Result<Vec<ArchivoSubido>, Box<dyn std::error::Error>> {
    let mut subidos = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let nombre_campo = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if nombre_campo.as_deref() != Some("file") {
            continue;
        }

        let nombre = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_else(|| "archivo sin nombre".to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        if bytes.is_empty() {
            return Err(format!("El archivo \"{}\" llegó vacío", nombre).into());
        }

        let archivo =
            drive::crear_archivo(&cfg.drive, &cfg.drive.carpeta_cargas_id, &nombre, &bytes)?;
        let url = drive::url_archivo(&cfg.drive, &archivo.id);
        subidos.push(ArchivoSubido {
            id: archivo.id,
            nombre: archivo.nombre,
            url,
        });
    }

    if subidos.is_empty() {
        return Err("Falta el campo \"file\"".into());
    }
    Ok(subidos)
}
