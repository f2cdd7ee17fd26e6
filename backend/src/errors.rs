//! Error taxonomy of the surgery-assistance pipeline.
//!
//! Each component raises its own kind instead of collapsing everything
//! into one generic error: validation failures abort before any side
//! effect, while failures inside the multi-step external operations leave
//! whatever partial artifacts already exist (no rollback is modeled).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CxError {
    /// Mandatory fields (fecha, ID de proyecto, paciente) are missing.
    #[error("Falta fecha, ID de proyecto o paciente.")]
    DatosFaltantes,

    /// The authorized-products column is blank; authorization requires it.
    #[error("La columna de productos autorizados y a enviar está vacía.")]
    MaterialFaltante,

    /// Idempotency guard: the surgery was already authorized.
    #[error("La cirugía ya está autorizada.")]
    YaAutorizada,

    /// The caller cannot edit the protected status cell. The message
    /// carries the remediation instructions shown to the user.
    #[error("Sin permisos de edición: {0}")]
    SinPermisos(String),

    #[error("Error al crear la carpeta: {0}")]
    Aprovisionamiento(String),

    #[error("Error al generar el PDF: {0}")]
    Render(String),

    #[error("Carpeta no encontrada: {0}")]
    CarpetaNoEncontrada(String),

    #[error("Archivo no encontrado: {0}")]
    ArchivoNoEncontrado(String),

    #[error("Hoja \"{0}\" no encontrada")]
    HojaNoEncontrada(String),

    #[error("Fila {0} fuera de rango en la hoja \"{1}\"")]
    FilaInvalida(usize, String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Db(#[from] rusqlite::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
