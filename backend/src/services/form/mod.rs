//! Ingestion of form submission events.
//!
//! `POST /api/form/submit` receives the submission payload (either event
//! shape), resolves the destination folder from the answers and relocates
//! the uploaded files into it as a background job.

use actix_web::web::{post, scope};
use actix_web::Scope;

mod submit;

pub use submit::{extraer_archivos, extraer_respuestas, procesar_envio};

const API_PATH: &str = "/api/form";

/// Configures and returns the Actix scope for the form routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/submit", post().to(submit::process))
}
