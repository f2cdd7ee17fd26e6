//! Summary-document rendering.
//!
//! The template is a plain-text document stored in the drive catalog with
//! six literal `<<...>>` tokens. Rendering duplicates it into the surgery
//! folder, substitutes the tokens across the whole document, exports the
//! result to PDF and trashes the editable intermediate. Nothing verifies
//! that the template actually contains every token; unmatched tokens stay
//! behind as literal text.

use crate::config::{Config, Formatos};
use crate::drive::{self, Archivo, Carpeta};
use crate::errors::CxError;
use crate::fechas;
use common::model::cirugia::Cirugia;
use genpdf::elements::{Break, Paragraph};
use genpdf::Document;

/// Record fields display-formatted for the document.
#[derive(Debug, Clone)]
pub struct DatosPdf {
    pub fecha_cx: String,
    pub hora_cx: String,
    pub paciente: String,
    pub institucion: String,
    pub medico: String,
    pub material: String,
}

pub fn preparar_datos_para_pdf(datos: &Cirugia, formatos: &Formatos) -> DatosPdf {
    DatosPdf {
        fecha_cx: fechas::formatear_fecha_arg(&datos.fecha_cx, formatos),
        hora_cx: fechas::formatear_hora(&datos.hora_cx, formatos),
        paciente: datos.paciente.clone(),
        institucion: datos.institucion.clone(),
        medico: datos.medico.clone(),
        material: datos.material.clone(),
    }
}

/// Whole-document substitution of the six fixed tokens. A token appearing
/// several times is replaced everywhere; absent values become the empty
/// string.
pub fn sustituir_marcadores(texto: &str, datos: &DatosPdf) -> String {
    let reemplazos = [
        ("<<FECHA_CX>>", datos.fecha_cx.as_str()),
        ("<<HORA_CX>>", datos.hora_cx.as_str()),
        ("<<PACIENTE>>", datos.paciente.as_str()),
        ("<<INSTITUCION>>", datos.institucion.as_str()),
        ("<<MEDICO>>", datos.medico.as_str()),
        ("<<MATERIAL>>", datos.material.as_str()),
    ];

    let mut resultado = texto.to_string();
    for (marcador, valor) in reemplazos {
        resultado = resultado.replace(marcador, valor);
    }
    resultado
}

/// Generates the surgery summary inside `carpeta` and returns the
/// exported PDF file. No partial cleanup on failure: the intermediate
/// copy may be left behind.
pub fn generar_pdf_cx(
    cfg: &Config,
    carpeta: &Carpeta,
    datos: &DatosPdf,
) -> Result<Archivo, CxError> {
    let nombre_doc = format!("Resumen CX - {}", datos.paciente);

    // 1. Duplicar la plantilla en la carpeta destino.
    let copia = drive::copiar_archivo(&cfg.drive, &cfg.drive.plantilla_doc_id, &carpeta.id, &nombre_doc)
        .map_err(|e| CxError::Render(e.to_string()))?;

    // 2. Sustituir marcadores y persistir la copia editada.
    let texto = String::from_utf8_lossy(&drive::leer_blob(&cfg.drive, &copia.id)?).into_owned();
    let sustituido = sustituir_marcadores(&texto, datos);
    drive::escribir_blob(&cfg.drive, &copia.id, sustituido.as_bytes())?;

    // 3. Exportar a PDF.
    let mut pdf_bytes = Vec::new();
    construir_documento(cfg, &nombre_doc, &sustituido)?
        .render(&mut pdf_bytes)
        .map_err(|e| CxError::Render(e.to_string()))?;
    let nombre_pdf = format!("{}.pdf", nombre_doc);
    let pdf = drive::crear_archivo(&cfg.drive, &carpeta.id, &nombre_pdf, &pdf_bytes)?;

    // 4. Descartar la copia editable intermedia.
    drive::mover_a_papelera(&cfg.drive, &copia.id)?;

    Ok(pdf)
}

fn cargar_fuente(cfg: &Config) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, CxError> {
    if let Ok(familia) = genpdf::fonts::from_files(&cfg.fuentes, "Arial", None) {
        return Ok(familia);
    }
    genpdf::fonts::from_files(&cfg.fuentes, "LiberationSans", None)
        .map_err(|e| CxError::Render(format!("no se pudo cargar la fuente: {}", e)))
}

/// Builds the genpdf document line by line: blank lines become breaks,
/// `"- "` lines become bullet items, everything else is a paragraph.
fn construir_documento(cfg: &Config, titulo: &str, texto: &str) -> Result<Document, CxError> {
    let mut doc = Document::new(cargar_fuente(cfg)?);
    doc.set_title(titulo);
    doc.set_font_size(11);
    doc.set_line_spacing(1.0);

    let mut decorador = genpdf::SimplePageDecorator::new();
    decorador.set_margins(10);
    doc.set_page_decorator(decorador);

    for linea in texto.lines() {
        if linea.is_empty() {
            doc.push(Break::new(1));
        } else if let Some(item) = linea.strip_prefix("- ") {
            doc.push(Paragraph::new(format!("• {}", item)));
        } else {
            doc.push(Paragraph::new(linea));
        }
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLANTILLA: &str = "Resumen de cirugía\n\
         Fecha: <<FECHA_CX>> a las <<HORA_CX>>\n\
         Paciente: <<PACIENTE>>\n\
         Institución: <<INSTITUCION>>\n\
         Médico: <<MEDICO>>\n\
         - Material: <<MATERIAL>>\n\
         Recordatorio para <<PACIENTE>>.";

    fn datos() -> DatosPdf {
        DatosPdf {
            fecha_cx: "10/05/2024".to_string(),
            hora_cx: "14:30".to_string(),
            paciente: "Jane Doe".to_string(),
            institucion: "General Hospital".to_string(),
            medico: "Dr. Smith".to_string(),
            material: "Kit A".to_string(),
        }
    }

    #[test]
    fn sustituye_todos_los_marcadores() {
        let resultado = sustituir_marcadores(PLANTILLA, &datos());
        assert!(!resultado.contains("<<"));
        assert!(!resultado.contains(">>"));
        assert!(resultado.contains("Fecha: 10/05/2024 a las 14:30"));
        assert!(resultado.contains("Paciente: Jane Doe"));
        assert!(resultado.contains("- Material: Kit A"));
    }

    #[test]
    fn un_marcador_repetido_se_reemplaza_en_todas_partes() {
        let resultado = sustituir_marcadores(PLANTILLA, &datos());
        assert_eq!(resultado.matches("Jane Doe").count(), 2);
    }

    #[test]
    fn marcadores_desconocidos_quedan_como_texto_literal() {
        let resultado = sustituir_marcadores("Hola <<OTRO>> <<PACIENTE>>", &datos());
        assert_eq!(resultado, "Hola <<OTRO>> Jane Doe");
    }

    #[test]
    fn valores_ausentes_quedan_vacios() {
        let mut vacios = datos();
        vacios.hora_cx = String::new();
        let resultado = sustituir_marcadores("a las <<HORA_CX>>.", &vacios);
        assert_eq!(resultado, "a las .");
    }
}
