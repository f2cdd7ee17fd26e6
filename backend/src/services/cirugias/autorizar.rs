//! Authorization of one agenda row.
//!
//! All gates run before any side effect, in a fixed order: mandatory
//! fields, material, idempotency, protections. Once the gates pass, the
//! status cell is written and the row is painted; the row keeps its data
//! if any gate fails.

use crate::config::Config;
use crate::errors::CxError;
use crate::services::respuesta_de_error;
use crate::sheets;
use actix_web::{web, HttpResponse, Responder};
use common::requests::AutorizarRequest;
use log::info;

/// The Actix handler for `POST /api/cirugias/autorizar`.
pub(crate) async fn process(
    cfg: web::Data<Config>,
    payload: web::Json<AutorizarRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    match autorizar_cirugia(&cfg, &req) {
        Ok(()) => {
            info!("Cirugía autorizada: hoja \"{}\", fila {}", req.hoja, req.fila);
            HttpResponse::Ok().json(serde_json::json!({ "mensaje": "Cirugía autorizada." }))
        }
        Err(err) => respuesta_de_error(&err),
    }
}

/// Validates and authorizes the row identified by `req`.
///
/// Gate order is fixed: missing mandatory fields are reported before
/// missing material, and both before the already-authorized check. The
/// protection check runs last, inside the status write itself.
pub fn autorizar_cirugia(cfg: &Config, req: &AutorizarRequest) -> Result<(), CxError> {
    let datos = sheets::obtener_datos_fila(&cfg.sheets, &req.hoja, req.fila)?;

    if !datos.es_completa() {
        return Err(CxError::DatosFaltantes);
    }
    if !datos.tiene_material() {
        return Err(CxError::MaterialFaltante);
    }
    if datos.estado == cfg.sheets.estados.autorizada {
        return Err(CxError::YaAutorizada);
    }

    sheets::actualizar_estado_cx(
        &cfg.sheets,
        &req.hoja,
        req.fila,
        &cfg.sheets.estados.autorizada,
        req.usuario.as_deref(),
    )?;
    sheets::formatear_fila_cx(&cfg.sheets, &req.hoja, req.fila, &cfg.sheets.colores.autorizada)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Proteccion, SheetsConfig};
    use std::fs;
    use tempfile::TempDir;

    const AGENDA: &str = "\
Fecha,Estado,ID,Paciente,Institución,Hora,Médico,Cliente\n\
,,,,,,,\n\
2024-05-10,,2024/05/10-0001,Jane Doe,General Hospital,14:30,Dr. Smith,ACME,,,,,,,,,,Kit A\n\
2024-05-11,,2024/05/11-0002,John Roe,General Hospital,09:00,Dr. Smith,ACME\n";

    fn cfg_temporal() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Agenda Cx.csv"), AGENDA).unwrap();
        let cfg = Config {
            sheets: SheetsConfig {
                dir: dir.path().to_path_buf(),
                ..SheetsConfig::default()
            },
            ..Config::default()
        };
        (dir, cfg)
    }

    fn req(fila: usize, usuario: Option<&str>) -> AutorizarRequest {
        AutorizarRequest {
            hoja: "Agenda Cx".to_string(),
            fila,
            usuario: usuario.map(str::to_string),
        }
    }

    #[test]
    fn autoriza_y_luego_rechaza_la_repeticion() {
        let (_dir, cfg) = cfg_temporal();

        autorizar_cirugia(&cfg, &req(3, None)).unwrap();
        assert!(sheets::esta_autorizada(&cfg.sheets, "Agenda Cx", 3).unwrap());
        assert_eq!(
            sheets::color_de_fila(&cfg.sheets, "Agenda Cx", 3).as_deref(),
            Some("#d9ead3")
        );

        assert!(matches!(
            autorizar_cirugia(&cfg, &req(3, None)),
            Err(CxError::YaAutorizada)
        ));
    }

    #[test]
    fn sin_material_no_toca_la_fila() {
        let (_dir, cfg) = cfg_temporal();

        // Fila 4 tiene los obligatorios pero no material (columna R).
        assert!(matches!(
            autorizar_cirugia(&cfg, &req(4, None)),
            Err(CxError::MaterialFaltante)
        ));
        assert!(!sheets::esta_autorizada(&cfg.sheets, "Agenda Cx", 4).unwrap());
        assert!(sheets::color_de_fila(&cfg.sheets, "Agenda Cx", 4).is_none());
    }

    #[test]
    fn fila_vacia_reporta_datos_faltantes() {
        let (_dir, cfg) = cfg_temporal();
        assert!(matches!(
            autorizar_cirugia(&cfg, &req(2, None)),
            Err(CxError::DatosFaltantes)
        ));
    }

    #[test]
    fn proteccion_bloquea_a_quien_no_es_editor() {
        let (_dir, mut cfg) = cfg_temporal();
        cfg.sheets.protecciones.push(Proteccion {
            hoja: "Agenda Cx".to_string(),
            fila_desde: 1,
            fila_hasta: 100,
            columna_desde: 1,
            columna_hasta: 18,
            editores: vec!["dueña@clinica.com".to_string()],
        });

        assert!(matches!(
            autorizar_cirugia(&cfg, &req(3, Some("otro@x.com"))),
            Err(CxError::SinPermisos(_))
        ));
        assert!(!sheets::esta_autorizada(&cfg.sheets, "Agenda Cx", 3).unwrap());

        autorizar_cirugia(&cfg, &req(3, Some("dueña@clinica.com"))).unwrap();
        assert!(sheets::esta_autorizada(&cfg.sheets, "Agenda Cx", 3).unwrap());
    }
}
