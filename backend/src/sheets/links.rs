//! Append-only run log ("links sheet").
//!
//! One row per completed workflow run, fixed 12-column layout, with the
//! PDF and form links written as clickable hyperlink formulas. Nothing
//! deduplicates: retrying a run appends another row, and that is the
//! accepted behavior.

use crate::config::SheetsConfig;
use crate::errors::CxError;
use common::model::registro::RegistroLink;
use std::fs::OpenOptions;
use std::path::PathBuf;

const ENCABEZADOS: [&str; 12] = [
    "Fecha cx",
    "Hora cx",
    "Paciente",
    "Institución",
    "Médico",
    "Material",
    "Resumen PDF",
    "Form Técnica",
    "Nombre carpeta",
    "ID carpeta",
    "Hoja",
    "Fila",
];

fn ruta_links(cfg: &SheetsConfig) -> PathBuf {
    cfg.dir.join(format!("{}.csv", cfg.hoja_links))
}

/// Appends one run to the links sheet, creating it with its header row on
/// first use.
pub fn guardar_link(cfg: &SheetsConfig, registro: &RegistroLink) -> Result<(), CxError> {
    let ruta = ruta_links(cfg);

    if !ruta.exists() {
        std::fs::create_dir_all(&cfg.dir)?;
        let mut escritor = csv::Writer::from_path(&ruta)?;
        escritor.write_record(ENCABEZADOS)?;
        escritor.flush()?;
    }

    let archivo = OpenOptions::new().append(true).open(&ruta)?;
    let mut escritor = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(archivo);
    let formula_pdf = format!("=HYPERLINK(\"{}\";\"PDF\")", registro.pdf_url);
    let formula_form = format!("=HYPERLINK(\"{}\";\"Formulario\")", registro.link_form);
    let fila = registro.fila_origen.to_string();
    escritor.write_record([
        registro.fecha_cx.as_str(),
        registro.hora_cx.as_str(),
        registro.paciente.as_str(),
        registro.institucion.as_str(),
        registro.medico.as_str(),
        registro.material.as_str(),
        formula_pdf.as_str(),
        formula_form.as_str(),
        registro.nombre_carpeta.as_str(),
        registro.id_carpeta.as_str(),
        registro.hoja_origen.as_str(),
        fila.as_str(),
    ])?;
    escritor.flush()?;
    Ok(())
}
