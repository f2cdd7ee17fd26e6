//! Display and machine formatting of agenda cells.
//!
//! Structured date/time values render with the configured patterns; text
//! passes through unchanged and blank cells become the empty string, so
//! formatting never fails on missing input.

use crate::config::Formatos;
use common::model::celda::Celda;

/// Argentine display format (`dd/MM/yyyy`).
pub fn formatear_fecha_arg(valor: &Celda, formatos: &Formatos) -> String {
    formatear_fecha(valor, &formatos.fecha_arg, formatos)
}

/// Machine format for the pre-filled form (`yyyy-MM-dd`).
pub fn formatear_fecha_form(valor: &Celda, formatos: &Formatos) -> String {
    formatear_fecha(valor, &formatos.fecha_form, formatos)
}

/// Filename-safe format (`yyyy-MM-dd`).
pub fn formatear_fecha_nombre(valor: &Celda, formatos: &Formatos) -> String {
    formatear_fecha(valor, &formatos.fecha_filename, formatos)
}

/// 24-hour `HH:mm`.
pub fn formatear_hora(valor: &Celda, formatos: &Formatos) -> String {
    match valor {
        Celda::Hora(hora) => hora.format(&formatos.hora).to_string(),
        Celda::Fecha(fecha) => fecha.format(&formatos.fecha_arg).to_string(),
        Celda::Texto(texto) => texto.clone(),
        Celda::Vacia => String::new(),
    }
}

fn formatear_fecha(valor: &Celda, patron: &str, formatos: &Formatos) -> String {
    match valor {
        Celda::Fecha(fecha) => fecha.format(patron).to_string(),
        Celda::Hora(hora) => hora.format(&formatos.hora).to_string(),
        Celda::Texto(texto) => texto.clone(),
        Celda::Vacia => String::new(),
    }
}
