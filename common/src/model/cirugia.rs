use crate::model::celda::Celda;
use serde::{Deserialize, Serialize};

/// One row of the surgery agenda, mapped from positional columns into a
/// typed record at the sheet boundary.
///
/// Identity is the (hoja, fila) pair; the row itself lives in the tabular
/// store and is mutated in place there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cirugia {
    pub fecha_cx: Celda,
    pub hora_cx: Celda,
    pub id_proyecto: String,
    pub estado: String,
    pub paciente: String,
    pub institucion: String,
    pub medico: String,
    pub cliente: String,
    pub material: String,
    /// Source sheet name.
    pub hoja: String,
    /// Source row index (1-based, as in the sheet).
    pub fila: usize,
}

impl Cirugia {
    /// Mandatory-field check: fecha, id de proyecto and paciente must all
    /// be present. Institución, médico and material are deliberately not
    /// validated here; callers add their own gating (authorization also
    /// requires material).
    pub fn es_completa(&self) -> bool {
        !self.fecha_cx.es_vacia()
            && !self.id_proyecto.trim().is_empty()
            && !self.paciente.trim().is_empty()
    }

    /// Material (authorized products) must be non-blank to authorize.
    pub fn tiene_material(&self) -> bool {
        !self.material.trim().is_empty()
    }
}
