//! Pre-filled form link construction.
//!
//! The link is pure data: a fixed base plus eight `entry=value` pairs in a
//! fixed order, percent-encoded as standard URI components. The folder
//! name travels inside the link so the submission trigger can resolve the
//! destination folder from form-response text alone.

use crate::config::{FormConfig, Formatos};
use crate::fechas;
use common::model::cirugia::Cirugia;
use url::form_urlencoded;

/// Record fields as the form expects them (fecha already in machine form).
#[derive(Debug, Clone)]
pub struct DatosForm {
    pub paciente: String,
    pub fecha_cx_form: String,
    pub hora_cx: String,
    pub institucion: String,
    pub medico: String,
    pub material: String,
}

pub fn preparar_datos_para_form(datos: &Cirugia, formatos: &Formatos) -> DatosForm {
    DatosForm {
        paciente: datos.paciente.clone(),
        fecha_cx_form: fechas::formatear_fecha_form(&datos.fecha_cx, formatos),
        hora_cx: fechas::formatear_hora(&datos.hora_cx, formatos),
        institucion: datos.institucion.clone(),
        medico: datos.medico.clone(),
        material: datos.material.clone(),
    }
}

/// Builds the pre-filled link. Deterministic: identical inputs always
/// yield byte-identical output.
pub fn crear_link_prellenado(
    cfg: &FormConfig,
    nombre_carpeta: &str,
    id_carpeta: &str,
    datos: &DatosForm,
) -> String {
    let base = format!("{}{}/viewform?", cfg.url_base, cfg.id);

    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair(&cfg.entries.paciente, &datos.paciente);
    query.append_pair(&cfg.entries.fecha_cx, &datos.fecha_cx_form);
    query.append_pair(&cfg.entries.hora_cx, &datos.hora_cx);
    query.append_pair(&cfg.entries.institucion, &datos.institucion);
    query.append_pair(&cfg.entries.medico, &datos.medico);
    query.append_pair(&cfg.entries.material, &datos.material);
    query.append_pair(&cfg.entries.folder_name, nombre_carpeta);
    query.append_pair(&cfg.entries.folder_id, id_carpeta);

    format!("{}{}", base, query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datos() -> DatosForm {
        DatosForm {
            paciente: "Jane Doe".to_string(),
            fecha_cx_form: "2024-05-10".to_string(),
            hora_cx: "14:30".to_string(),
            institucion: "General Hospital".to_string(),
            medico: "Dr. Pérez & Asociados".to_string(),
            material: "Kit A = básico".to_string(),
        }
    }

    #[test]
    fn es_determinista() {
        let cfg = FormConfig::default();
        let a = crear_link_prellenado(&cfg, "2024/05/10-0001 - Jane Doe", "abc123", &datos());
        let b = crear_link_prellenado(&cfg, "2024/05/10-0001 - Jane Doe", "abc123", &datos());
        assert_eq!(a, b);
    }

    #[test]
    fn base_y_orden_fijos() {
        let cfg = FormConfig::default();
        let link = crear_link_prellenado(&cfg, "carpeta", "id", &datos());
        assert!(link.starts_with(&format!("{}{}/viewform?", cfg.url_base, cfg.id)));

        let pos = |entry: &str| link.find(entry).unwrap();
        assert!(pos(&cfg.entries.paciente) < pos(&cfg.entries.fecha_cx));
        assert!(pos(&cfg.entries.fecha_cx) < pos(&cfg.entries.hora_cx));
        assert!(pos(&cfg.entries.material) < pos(&cfg.entries.folder_name));
        assert!(pos(&cfg.entries.folder_name) < pos(&cfg.entries.folder_id));
    }

    #[test]
    fn codifica_y_decodifica_caracteres_especiales() {
        let cfg = FormConfig::default();
        let link = crear_link_prellenado(&cfg, "2024/05/10-0001 - Jane Doe", "abc123", &datos());
        assert!(link.contains("Jane+Doe") || link.contains("Jane%20Doe"));

        let query = link.split('?').nth(1).unwrap();
        let pares: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        let valor = |clave: &str| {
            pares
                .iter()
                .find(|(k, _)| k == clave)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(valor(&cfg.entries.paciente), "Jane Doe");
        assert_eq!(valor(&cfg.entries.medico), "Dr. Pérez & Asociados");
        assert_eq!(valor(&cfg.entries.material), "Kit A = básico");
        assert_eq!(valor(&cfg.entries.folder_name), "2024/05/10-0001 - Jane Doe");
    }
}
