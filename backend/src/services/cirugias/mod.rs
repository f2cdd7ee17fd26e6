//! Surgery agenda endpoints.
//!
//! - `POST /api/cirugias/autorizar`: validates the row and marks it
//!   AUTORIZADA, synchronously.
//! - `POST /api/cirugias/flujo`: starts the folder + PDF + form-link
//!   workflow as a background job and returns a `job_id`.
//! - `POST /api/cirugias/ordenar`: re-sorts an agenda sheet by date.
//! - `GET /api/cirugias/status/{job_id}`: polls a background job.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod autorizar;
mod estado;
mod flujo;
mod ordenar;

pub use autorizar::autorizar_cirugia;

const API_PATH: &str = "/api/cirugias";

/// Configures and returns the Actix scope for the agenda routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/autorizar", post().to(autorizar::process))
        .route("/flujo", post().to(flujo::process))
        .route("/ordenar", post().to(ordenar::process))
        .route("/status/{job_id}", get().to(estado::process))
}
