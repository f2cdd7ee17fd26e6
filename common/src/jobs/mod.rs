use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub enum JobStatus {
    Pending,
    InProgress(u32),
    Completed(ResultadoFlujo),
    Failed(String),
}

/// Outcome of a completed background run, reported through the status
/// polling endpoint. The full workflow populates every field; the
/// submission-ingest job only fills `detalle`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ResultadoFlujo {
    pub nombre_carpeta: String,
    pub id_carpeta: String,
    pub pdf_url: String,
    pub link_form: String,
    pub detalle: String,
}
