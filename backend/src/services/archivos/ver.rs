use crate::config::Config;
use crate::drive;
use crate::services::respuesta_de_error;
use actix_web::{web, HttpResponse, Responder};

/// Serves a stored file with its content type guessed from the
/// registered name.
pub(crate) async fn process(
    cfg: web::Data<Config>,
    archivo_id: web::Path<String>,
) -> impl Responder {
    let id = archivo_id.into_inner();

    let nombre = match drive::nombre_archivo(&cfg.drive, &id) {
        Ok(nombre) => nombre,
        Err(err) => return respuesta_de_error(&err),
    };
    match drive::leer_blob(&cfg.drive, &id) {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&nombre).first_or_octet_stream();
            HttpResponse::Ok().content_type(mime.as_ref()).body(bytes)
        }
        Err(err) => respuesta_de_error(&err),
    }
}
