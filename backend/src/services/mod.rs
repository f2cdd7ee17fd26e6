//! HTTP surface of the service, one submodule per scope:
//!
//! - `/api/cirugias`: authorization, the full folder + PDF + form
//!   workflow, agenda sorting and job status polling.
//! - `/api/form`: ingestion of form submission events.
//! - `/api/archivos`: multipart uploads into the file store and serving of
//!   stored files.

pub mod archivos;
pub mod cirugias;
pub mod form;

use crate::errors::CxError;
use actix_web::HttpResponse;

/// Maps the error taxonomy onto HTTP statuses. Validation failures are
/// client errors; everything infrastructural is a 500.
pub(crate) fn respuesta_de_error(err: &CxError) -> HttpResponse {
    match err {
        CxError::DatosFaltantes | CxError::MaterialFaltante => {
            HttpResponse::BadRequest().body(err.to_string())
        }
        CxError::YaAutorizada => HttpResponse::Conflict().body(err.to_string()),
        CxError::SinPermisos(_) => HttpResponse::Forbidden().body(err.to_string()),
        CxError::HojaNoEncontrada(_)
        | CxError::FilaInvalida(_, _)
        | CxError::CarpetaNoEncontrada(_)
        | CxError::ArchivoNoEncontrado(_) => HttpResponse::NotFound().body(err.to_string()),
        _ => HttpResponse::InternalServerError().body(err.to_string()),
    }
}
