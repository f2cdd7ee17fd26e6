//! URL shortening with a two-service fallback.
//!
//! Tries the preferred external service first and the other one on
//! failure; if both fail, the original URL is returned unshortened. This
//! is the only place in the pipeline where anything is retried.

use crate::config::AcortadorConfig;
use log::warn;
use url::Url;

/// Shortens `url_larga`, falling back across services and finally to the
/// original input. Runs blocking; only called from job workers.
pub fn acortar_con_reintentos(cfg: &AcortadorConfig, url_larga: &str) -> String {
    if url_larga.len() < 10 {
        return url_larga.to_string();
    }

    let (primero, segundo): (Acortador, Acortador) = if cfg.servicio == "isgd" {
        (acortar_con_isgd, acortar_con_tinyurl)
    } else {
        (acortar_con_tinyurl, acortar_con_isgd)
    };

    match primero(url_larga) {
        Ok(corta) => corta,
        Err(e) => {
            warn!("Servicio de acortado preferido falló: {}", e);
            match segundo(url_larga) {
                Ok(corta) => corta,
                Err(e2) => {
                    warn!("Servicio alternativo también falló: {}; se usa la URL original", e2);
                    url_larga.to_string()
                }
            }
        }
    }
}

type Acortador = fn(&str) -> Result<String, String>;

fn pedir(api: Url) -> Result<String, String> {
    let respuesta = reqwest::blocking::get(api.as_str()).map_err(|e| e.to_string())?;
    let corta = respuesta.text().map_err(|e| e.to_string())?.trim().to_string();
    if corta.starts_with("http") {
        Ok(corta)
    } else {
        Err(format!("respuesta inválida: {}", corta))
    }
}

fn acortar_con_tinyurl(url_larga: &str) -> Result<String, String> {
    let api = Url::parse_with_params("https://tinyurl.com/api-create.php", &[("url", url_larga)])
        .map_err(|e| e.to_string())?;
    pedir(api)
}

fn acortar_con_isgd(url_larga: &str) -> Result<String, String> {
    let api = Url::parse_with_params(
        "https://is.gd/create.php",
        &[("format", "simple"), ("url", url_larga)],
    )
    .map_err(|e| e.to_string())?;
    pedir(api)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_demasiado_cortas_pasan_sin_tocar() {
        let cfg = AcortadorConfig::default();
        assert_eq!(acortar_con_reintentos(&cfg, ""), "");
        assert_eq!(acortar_con_reintentos(&cfg, "x"), "x");
    }
}
