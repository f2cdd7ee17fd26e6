//! End-to-end exercise of the workflow pieces over temporary stores:
//! authorization, folder creation, template substitution, link building,
//! the run log, and the submission-driven relocation of uploads.

use backend::config::{Config, DriveConfig, SheetsConfig};
use backend::services::cirugias::autorizar_cirugia;
use backend::services::form::procesar_envio;
use backend::{drive, formlink, pdf, sheets};
use common::model::envio::EnvioFormulario;
use common::model::registro::RegistroLink;
use common::requests::AutorizarRequest;
use std::fs;
use tempfile::TempDir;

const AGENDA: &str = "\
Fecha,Estado,ID,Paciente,Institución,Hora,Médico,Cliente\n\
,,,,,,,\n\
2024-05-10,,2024/05/10-0001,Jane Doe,General Hospital,14:30,Dr. Smith,ACME,,,,,,,,,,Kit A\n";

const PLANTILLA: &str = "\
Resumen de cirugía\n\
\n\
Fecha: <<FECHA_CX>> a las <<HORA_CX>>\n\
Paciente: <<PACIENTE>>\n\
Institución: <<INSTITUCION>>\n\
Médico: <<MEDICO>>\n\
\n\
- Material: <<MATERIAL>>\n";

fn entorno() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    let plantilla = dir.path().join("resumen_cx.txt");
    fs::write(&plantilla, PLANTILLA).unwrap();

    let hojas = dir.path().join("hojas");
    fs::create_dir_all(&hojas).unwrap();
    fs::write(hojas.join("Agenda Cx.csv"), AGENDA).unwrap();

    let cfg = Config {
        drive: DriveConfig {
            raiz: dir.path().join("drive"),
            plantilla_origen: plantilla,
            ..DriveConfig::default()
        },
        sheets: SheetsConfig {
            dir: hojas,
            ..SheetsConfig::default()
        },
        ..Config::default()
    };
    drive::init(&cfg.drive).unwrap();
    (dir, cfg)
}

#[test]
fn autoriza_crea_carpeta_sustituye_y_registra() {
    let (_dir, cfg) = entorno();

    // Autorización de la fila.
    autorizar_cirugia(
        &cfg,
        &AutorizarRequest {
            hoja: "Agenda Cx".to_string(),
            fila: 3,
            usuario: None,
        },
    )
    .unwrap();
    assert!(sheets::esta_autorizada(&cfg.sheets, "Agenda Cx", 3).unwrap());

    // Carpeta de la cirugía.
    let datos = sheets::obtener_datos_fila(&cfg.sheets, "Agenda Cx", 3).unwrap();
    let carpeta =
        drive::crear_carpeta_cx(&cfg.drive, &datos.id_proyecto, &datos.paciente).unwrap();
    assert_eq!(carpeta.nombre, "2024/05/10-0001 - Jane Doe");

    // Sustitución de marcadores sobre la plantilla registrada.
    let texto =
        String::from_utf8(drive::leer_blob(&cfg.drive, &cfg.drive.plantilla_doc_id).unwrap())
            .unwrap();
    let datos_pdf = pdf::preparar_datos_para_pdf(&datos, &cfg.formatos);
    let sustituido = pdf::sustituir_marcadores(&texto, &datos_pdf);
    assert!(!sustituido.contains("<<"));
    assert!(sustituido.contains("Jane Doe"));
    assert!(sustituido.contains("10/05/2024"));
    assert!(sustituido.contains("Kit A"));

    // Registro del resultado como archivo dentro de la carpeta.
    let archivo_pdf = drive::crear_archivo(
        &cfg.drive,
        &carpeta.id,
        "Resumen CX - Jane Doe.pdf",
        sustituido.as_bytes(),
    )
    .unwrap();
    let pdf_url = drive::url_archivo(&cfg.drive, &archivo_pdf.id);
    assert!(pdf_url.ends_with(&format!("/d/{}/view", archivo_pdf.id)));

    // Link prellenado: lleva los datos y el nombre de la carpeta.
    let datos_form = formlink::preparar_datos_para_form(&datos, &cfg.formatos);
    let link_form =
        formlink::crear_link_prellenado(&cfg.form, &carpeta.nombre, &carpeta.id, &datos_form);
    assert!(link_form.contains("Jane+Doe") || link_form.contains("Jane%20Doe"));
    assert!(link_form.contains(&cfg.form.entries.folder_name));

    // Hoja de links: encabezado más la fila con las fórmulas.
    let registro = RegistroLink {
        fecha_cx: "10/05/2024".to_string(),
        hora_cx: "14:30".to_string(),
        paciente: datos.paciente.clone(),
        institucion: datos.institucion.clone(),
        medico: datos.medico.clone(),
        material: datos.material.clone(),
        pdf_url: pdf_url.clone(),
        link_form: link_form.clone(),
        nombre_carpeta: carpeta.nombre.clone(),
        id_carpeta: carpeta.id.clone(),
        hoja_origen: "Agenda Cx".to_string(),
        fila_origen: 3,
    };
    sheets::links::guardar_link(&cfg.sheets, &registro).unwrap();

    let contenido = fs::read_to_string(
        cfg.sheets
            .dir
            .join(format!("{}.csv", cfg.sheets.hoja_links)),
    )
    .unwrap();
    assert!(contenido.lines().next().unwrap().contains("Resumen PDF"));
    assert!(contenido.contains("HYPERLINK"));
    assert!(contenido.contains(&pdf_url));
}

#[test]
fn el_envio_del_formulario_reubica_los_adjuntos() {
    let (_dir, cfg) = entorno();

    let carpeta = drive::crear_carpeta_cx(&cfg.drive, "2024/05/10-0001", "Jane Doe").unwrap();
    let subido = drive::crear_archivo(
        &cfg.drive,
        &cfg.drive.carpeta_cargas_id,
        "radiografia.png",
        b"png bytes",
    )
    .unwrap();

    let json = format!(
        r#"{{"response": {{"itemResponses": [
            {{"title": "Nombre de carpeta (ID de carpeta)", "response": "2024/05/10-0001 - Jane Doe"}},
            {{"title": "Adjuntos", "response": ["{}"]}}
        ]}}}}"#,
        subido.id
    );
    let envio: EnvioFormulario = serde_json::from_str(&json).unwrap();
    assert_eq!(procesar_envio(&cfg, envio).unwrap(), 1);

    assert_eq!(
        drive::nombre_archivo(&cfg.drive, &subido.id).unwrap(),
        "2024/05/10-0001 - radiografia.png"
    );
    assert_eq!(drive::padres_de(&cfg.drive, &subido.id).unwrap(), vec![carpeta.id]);
}
