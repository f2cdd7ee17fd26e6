//! File-store endpoints.
//!
//! - `POST /api/archivos/subir`: multipart upload into the form-uploads
//!   folder; the submission trigger later relocates the files.
//! - `GET /api/archivos/d/{archivo_id}/view`: serves a stored file, the
//!   same URL shape the workflow writes into the links sheet.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod upload;
mod ver;

const API_PATH: &str = "/api/archivos";

/// Configures and returns the Actix scope for the file-store routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/subir", post().to(upload::process))
        .route("/d/{archivo_id}/view", get().to(ver::process))
}
