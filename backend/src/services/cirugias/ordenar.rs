//! Re-sorts an agenda sheet ascending by its date column.
//!
//! Defaults match the agenda layout: data starts at row 3 (two header
//! rows) and the date lives in column 1.

use crate::config::Config;
use crate::services::respuesta_de_error;
use crate::sheets;
use actix_web::{web, HttpResponse, Responder};
use common::requests::OrdenarRequest;

const FILA_INICIO_DEFAULT: usize = 3;
const COLUMNA_FECHA_DEFAULT: usize = 1;

/// The Actix handler for `POST /api/cirugias/ordenar`.
pub(crate) async fn process(
    cfg: web::Data<Config>,
    payload: web::Json<OrdenarRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    let fila_inicio = req.fila_inicio.unwrap_or(FILA_INICIO_DEFAULT);
    let columna = req.columna.unwrap_or(COLUMNA_FECHA_DEFAULT);

    match sheets::ordenar_por_fecha(&cfg.sheets, &req.hoja, fila_inicio, columna) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "mensaje": "Hoja ordenada." })),
        Err(err) => respuesta_de_error(&err),
    }
}
