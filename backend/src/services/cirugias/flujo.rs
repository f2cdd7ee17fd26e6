//! The full post-authorization workflow, run as a background job.
//!
//! `POST /api/cirugias/flujo` schedules the job and immediately returns a
//! `job_id` for polling. The worker then runs the fixed step sequence:
//!
//! 1. read and validate the agenda row,
//! 2. create the surgery folder (`"{id_proyecto} - {paciente}"`),
//! 3. write the folder hyperlink back into the source row,
//! 4. render the summary PDF inside the folder,
//! 5. build the pre-filled form link (optionally shortened),
//! 6. append the run to the links sheet.
//!
//! There is no rollback: a failure at step N leaves the artifacts of
//! steps 1..N in place, and the job reports `Failed` with the step's
//! error. Re-running creates a second folder and appends a second row.

use crate::config::Config;
use crate::errors::CxError;
use crate::formlink;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::{drive, fechas, pdf, sheets, shortener};
use actix_web::{web, HttpResponse, Responder};
use common::jobs::{JobStatus, ResultadoFlujo};
use common::model::registro::RegistroLink;
use common::requests::FlujoRequest;
use tokio::sync::mpsc;
use uuid::Uuid;

const TOTAL_PASOS: usize = 6;

/// Progress message from the blocking worker to the async listener.
#[derive(Debug)]
enum FlujoUpdate {
    Job(JobStatus),
    Paso(usize),
}

/// The Actix handler for `POST /api/cirugias/flujo`.
pub(crate) async fn process(
    cfg: web::Data<Config>,
    state: web::Data<JobsState>,
    payload: web::Json<FlujoRequest>,
) -> impl Responder {
    match schedule_flujo_job(cfg, state, payload.into_inner()).await {
        Ok(job_id) => HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id })),
        Err(err) => HttpResponse::InternalServerError().body(err),
    }
}

/// Registers the job as `Pending` and spawns its lifecycle task. The
/// blocking work runs on the dedicated thread pool; a listener translates
/// per-step progress into `InProgress` percentages for the central
/// controller.
async fn schedule_flujo_job(
    cfg: web::Data<Config>,
    state: web::Data<JobsState>,
    req: FlujoRequest,
) -> Result<String, String> {
    let job_id = Uuid::new_v4().to_string();
    state
        .jobs
        .write()
        .await
        .insert(job_id.clone(), JobStatus::Pending);

    let tx = state.tx.clone();
    let job_id_clone = job_id.clone();
    let cfg = cfg.get_ref().clone();

    tokio::spawn(async move {
        let (flujo_tx, mut flujo_rx) = mpsc::channel::<FlujoUpdate>(100);

        let job_updater_tx = tx.clone();
        let job_id_for_updater = job_id_clone.clone();
        tokio::spawn(async move {
            while let Some(update) = flujo_rx.recv().await {
                let status = match update {
                    FlujoUpdate::Job(job_status) => job_status,
                    FlujoUpdate::Paso(numero) => {
                        let progreso = (numero as f32 / TOTAL_PASOS as f32 * 100.0) as u32;
                        JobStatus::InProgress(progreso)
                    }
                };
                let _ = job_updater_tx
                    .send(JobUpdate {
                        job_id: job_id_for_updater.clone(),
                        status,
                    })
                    .await;
            }
        });

        let handle =
            tokio::task::spawn_blocking(move || flujo_blocking(&cfg, flujo_tx, &req.hoja, req.fila));

        match handle.await {
            Ok(Ok(resultado)) => {
                let _ = tx
                    .send(JobUpdate {
                        job_id: job_id_clone,
                        status: JobStatus::Completed(resultado),
                    })
                    .await;
            }
            Ok(Err(e)) => {
                let _ = tx
                    .send(JobUpdate {
                        job_id: job_id_clone,
                        status: JobStatus::Failed(e),
                    })
                    .await;
            }
            Err(e) => {
                let _ = tx
                    .send(JobUpdate {
                        job_id: job_id_clone,
                        status: JobStatus::Failed(format!("Task join error: {}", e)),
                    })
                    .await;
            }
        }
    });

    Ok(job_id)
}

/// The synchronous workflow body, run via `spawn_blocking`. Reports one
/// `Paso` update after each completed step.
fn flujo_blocking(
    cfg: &Config,
    tx: mpsc::Sender<FlujoUpdate>,
    hoja: &str,
    fila: usize,
) -> Result<ResultadoFlujo, String> {
    let _ = tx.blocking_send(FlujoUpdate::Job(JobStatus::InProgress(0)));

    // 1. Leer y validar la fila.
    let datos = sheets::obtener_datos_fila(&cfg.sheets, hoja, fila).map_err(|e| e.to_string())?;
    if !datos.es_completa() {
        return Err(CxError::DatosFaltantes.to_string());
    }
    let _ = tx.blocking_send(FlujoUpdate::Paso(1));

    // 2. Crear la carpeta de la cirugía.
    let carpeta = drive::crear_carpeta_cx(&cfg.drive, &datos.id_proyecto, &datos.paciente)
        .map_err(|e| e.to_string())?;
    let _ = tx.blocking_send(FlujoUpdate::Paso(2));

    // 3. Enlazar la carpeta desde la fila de origen.
    let url_carpeta = drive::url_carpeta(&cfg.drive, &carpeta.id);
    sheets::insertar_hipervinculo_carpeta(&cfg.sheets, hoja, fila, &url_carpeta, &datos.id_proyecto)
        .map_err(|e| e.to_string())?;
    let _ = tx.blocking_send(FlujoUpdate::Paso(3));

    // 4. Generar el resumen PDF dentro de la carpeta.
    let datos_pdf = pdf::preparar_datos_para_pdf(&datos, &cfg.formatos);
    let archivo_pdf = pdf::generar_pdf_cx(cfg, &carpeta, &datos_pdf).map_err(|e| e.to_string())?;
    let pdf_url = drive::url_archivo(&cfg.drive, &archivo_pdf.id);
    let _ = tx.blocking_send(FlujoUpdate::Paso(4));

    // 5. Construir el link prellenado del formulario.
    let datos_form = formlink::preparar_datos_para_form(&datos, &cfg.formatos);
    let mut link_form =
        formlink::crear_link_prellenado(&cfg.form, &carpeta.nombre, &carpeta.id, &datos_form);
    if cfg.acortador.habilitado {
        link_form = shortener::acortar_con_reintentos(&cfg.acortador, &link_form);
    }
    let _ = tx.blocking_send(FlujoUpdate::Paso(5));

    // 6. Registrar la corrida en la hoja de links.
    let registro = RegistroLink {
        fecha_cx: fechas::formatear_fecha_arg(&datos.fecha_cx, &cfg.formatos),
        hora_cx: fechas::formatear_hora(&datos.hora_cx, &cfg.formatos),
        paciente: datos.paciente.clone(),
        institucion: datos.institucion.clone(),
        medico: datos.medico.clone(),
        material: datos.material.clone(),
        pdf_url: pdf_url.clone(),
        link_form: link_form.clone(),
        nombre_carpeta: carpeta.nombre.clone(),
        id_carpeta: carpeta.id.clone(),
        hoja_origen: hoja.to_string(),
        fila_origen: fila,
    };
    sheets::links::guardar_link(&cfg.sheets, &registro).map_err(|e| e.to_string())?;
    let _ = tx.blocking_send(FlujoUpdate::Paso(6));

    Ok(ResultadoFlujo {
        nombre_carpeta: carpeta.nombre,
        id_carpeta: carpeta.id,
        pdf_url,
        link_form,
        detalle: format!("Flujo completado para la fila {} de \"{}\"", fila, hoja),
    })
}
