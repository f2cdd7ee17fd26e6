use serde::Deserialize;

#[derive(Deserialize)]
/// Request payload for the authorization endpoint.
/// Identifies the agenda row plus the caller (checked against the
/// protections of the status column).
pub struct AutorizarRequest {
    pub hoja: String,
    pub fila: usize,
    pub usuario: Option<String>,
}

#[derive(Deserialize)]
/// Request payload for the full folder + PDF + form workflow.
pub struct FlujoRequest {
    pub hoja: String,
    pub fila: usize,
}

#[derive(Deserialize)]
/// Request payload for sorting an agenda sheet by its date column.
pub struct OrdenarRequest {
    pub hoja: String,
    pub fila_inicio: Option<usize>,
    pub columna: Option<usize>,
}
