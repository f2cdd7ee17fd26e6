use actix_web::{web, App, HttpServer};
use backend::config::Config;
use backend::job_controller::state::{start_job_updater, JobsState};
use backend::{drive, services};
use env_logger::Env;
use log::info;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let ruta_config = std::env::var("CX_CONFIG").unwrap_or_else(|_| "config.json".to_string());
    let cfg = Config::cargar(Path::new(&ruta_config))
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    // Provision the stores before accepting requests.
    drive::init(&cfg.drive)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    std::fs::create_dir_all(&cfg.sheets.dir)?;

    // Initialize job controller state
    let (tx, rx) = mpsc::channel(100);
    let jobs_state = JobsState {
        jobs: Arc::new(RwLock::new(HashMap::new())),
        tx,
    };

    // Start job updater task
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        start_job_updater(updater_state, rx).await;
    });

    let host = cfg.server.host.clone();
    let puerto = cfg.server.puerto;
    info!("Servidor escuchando en http://{}:{}", host, puerto);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(cfg.clone()))
            .app_data(web::Data::new(jobs_state.clone()))
            .service(services::cirugias::configure_routes())
            .service(services::form::configure_routes())
            .service(services::archivos::configure_routes())
    })
    .bind((host, puerto))?
    .run()
    .await
}
