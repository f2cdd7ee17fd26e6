use serde::{Deserialize, Serialize};

/// One completed workflow run, as appended to the links sheet.
///
/// All fields are already display-formatted strings; the links sheet is
/// append-only and positionally fixed (12 columns).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistroLink {
    pub fecha_cx: String,
    pub hora_cx: String,
    pub paciente: String,
    pub institucion: String,
    pub medico: String,
    pub material: String,
    pub pdf_url: String,
    pub link_form: String,
    pub nombre_carpeta: String,
    pub id_carpeta: String,
    pub hoja_origen: String,
    pub fila_origen: usize,
}
