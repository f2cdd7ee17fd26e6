//! Agenda sheet access.
//!
//! Each sheet is one CSV file under the configured directory, addressed
//! by 1-based row index with positional columns per the configured map.
//! Raw rows never leave this module: they are mapped into the typed
//! `Cirugia` record right here. Row formatting lives in a JSON sidecar
//! next to each sheet, and range protections are configuration data.

pub mod links;

use crate::config::SheetsConfig;
use crate::errors::CxError;
use common::model::celda::Celda;
use common::model::cirugia::Cirugia;
use log::warn;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

fn ruta_hoja(cfg: &SheetsConfig, hoja: &str) -> PathBuf {
    cfg.dir.join(format!("{}.csv", hoja))
}

fn ruta_formato(cfg: &SheetsConfig, hoja: &str) -> PathBuf {
    cfg.dir.join(format!("{}.formato.json", hoja))
}

fn leer_filas(cfg: &SheetsConfig, hoja: &str) -> Result<Vec<Vec<String>>, CxError> {
    let ruta = ruta_hoja(cfg, hoja);
    if !ruta.exists() {
        return Err(CxError::HojaNoEncontrada(hoja.to_string()));
    }
    let mut lector = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(&ruta)?;
    let mut filas = Vec::new();
    for registro in lector.records() {
        let registro = registro?;
        filas.push(registro.iter().map(|c| c.to_string()).collect());
    }
    Ok(filas)
}

fn escribir_filas(cfg: &SheetsConfig, hoja: &str, filas: &[Vec<String>]) -> Result<(), CxError> {
    let mut escritor = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(ruta_hoja(cfg, hoja))?;
    for fila in filas {
        escritor.write_record(fila)?;
    }
    escritor.flush()?;
    Ok(())
}

fn celda<'a>(fila: &'a [String], columna: usize) -> &'a str {
    columna
        .checked_sub(1)
        .and_then(|indice| fila.get(indice))
        .map(String::as_str)
        .unwrap_or("")
}

/// Reads one agenda row and maps its positional columns into the typed
/// record. Cells are parsed exactly once here.
pub fn obtener_datos_fila(cfg: &SheetsConfig, hoja: &str, fila: usize) -> Result<Cirugia, CxError> {
    let filas = leer_filas(cfg, hoja)?;
    let valores = filas
        .get(fila.checked_sub(1).ok_or(CxError::FilaInvalida(0, hoja.to_string()))?)
        .ok_or_else(|| CxError::FilaInvalida(fila, hoja.to_string()))?;

    let cols = &cfg.columnas;
    Ok(Cirugia {
        fecha_cx: Celda::desde_texto(celda(valores, cols.fecha_cx)),
        hora_cx: Celda::desde_texto(celda(valores, cols.hora_cx)),
        id_proyecto: celda(valores, cols.id_proyecto).trim().to_string(),
        estado: celda(valores, cols.estado).trim().to_string(),
        paciente: celda(valores, cols.paciente).trim().to_string(),
        institucion: celda(valores, cols.institucion).trim().to_string(),
        medico: celda(valores, cols.medico).trim().to_string(),
        cliente: celda(valores, cols.cliente).trim().to_string(),
        material: celda(valores, cols.material).trim().to_string(),
        hoja: hoja.to_string(),
        fila,
    })
}

pub fn esta_autorizada(cfg: &SheetsConfig, hoja: &str, fila: usize) -> Result<bool, CxError> {
    let datos = obtener_datos_fila(cfg, hoja, fila)?;
    Ok(datos.estado == cfg.estados.autorizada)
}

/// Checks whether `usuario` may edit the status cell of the given row.
/// An unprotected cell is editable by anyone; a protected cell only by
/// the protection's listed editors.
pub fn verificar_permisos_edicion(
    cfg: &SheetsConfig,
    hoja: &str,
    fila: usize,
    usuario: Option<&str>,
) -> bool {
    cfg.protecciones
        .iter()
        .filter(|p| p.cubre(hoja, fila, cfg.columnas.estado))
        .all(|p| p.puede_editar(usuario))
}

fn establecer_celda(
    cfg: &SheetsConfig,
    hoja: &str,
    fila: usize,
    columna: usize,
    valor: &str,
) -> Result<(), CxError> {
    let mut filas = leer_filas(cfg, hoja)?;
    let registro = filas
        .get_mut(fila - 1)
        .ok_or_else(|| CxError::FilaInvalida(fila, hoja.to_string()))?;
    if registro.len() < columna {
        registro.resize(columna, String::new());
    }
    registro[columna - 1] = valor.to_string();
    escribir_filas(cfg, hoja, &filas)
}

/// Writes the status cell. The protection check runs again at write time:
/// a protection change between the caller's check and this write surfaces
/// as a permissions failure with remediation instructions, never as a
/// generic error.
pub fn actualizar_estado_cx(
    cfg: &SheetsConfig,
    hoja: &str,
    fila: usize,
    estado: &str,
    usuario: Option<&str>,
) -> Result<(), CxError> {
    if !verificar_permisos_edicion(cfg, hoja, fila, usuario) {
        return Err(CxError::SinPermisos(format!(
            "La columna ESTADO está protegida. Pide al propietario de la hoja \"{}\" que te \
             agregue como editor autorizado en las protecciones de las columnas A-R.",
            hoja
        )));
    }
    establecer_celda(cfg, hoja, fila, cfg.columnas.estado, estado)
}

/// Paints the whole row, recorded in the sheet's format sidecar.
pub fn formatear_fila_cx(
    cfg: &SheetsConfig,
    hoja: &str,
    fila: usize,
    color: &str,
) -> Result<(), CxError> {
    let ruta = ruta_formato(cfg, hoja);
    let mut formatos: BTreeMap<String, String> = if ruta.exists() {
        serde_json::from_str(&fs::read_to_string(&ruta)?).unwrap_or_default()
    } else {
        BTreeMap::new()
    };
    formatos.insert(fila.to_string(), color.to_string());
    fs::write(&ruta, serde_json::to_string_pretty(&formatos).unwrap_or_default())?;
    Ok(())
}

/// Background color of a row, if any was applied.
pub fn color_de_fila(cfg: &SheetsConfig, hoja: &str, fila: usize) -> Option<String> {
    let ruta = ruta_formato(cfg, hoja);
    let texto = fs::read_to_string(ruta).ok()?;
    let formatos: BTreeMap<String, String> = serde_json::from_str(&texto).ok()?;
    formatos.get(&fila.to_string()).cloned()
}

/// Writes a clickable folder link into the project-id column of the
/// source row, mirroring what the workflow shows in the links sheet.
pub fn insertar_hipervinculo_carpeta(
    cfg: &SheetsConfig,
    hoja: &str,
    fila: usize,
    folder_url: &str,
    etiqueta: &str,
) -> Result<(), CxError> {
    let formula = format!("=HYPERLINK(\"{}\";\"📁 {}\")", folder_url, etiqueta);
    establecer_celda(cfg, hoja, fila, cfg.columnas.id_proyecto, &formula)
}

/// Sorts a sheet ascending by its date column from `fila_inicio` down.
/// Rows whose date cell does not parse sort after the dated ones.
/// Both indices are 1-based; 0 is out of range.
pub fn ordenar_por_fecha(
    cfg: &SheetsConfig,
    hoja: &str,
    fila_inicio: usize,
    columna: usize,
) -> Result<(), CxError> {
    let inicio = fila_inicio
        .checked_sub(1)
        .ok_or_else(|| CxError::FilaInvalida(fila_inicio, hoja.to_string()))?;
    columna
        .checked_sub(1)
        .ok_or_else(|| CxError::FilaInvalida(columna, hoja.to_string()))?;

    let mut filas = leer_filas(cfg, hoja)?;
    if filas.len() < fila_inicio {
        warn!("ordenar_por_fecha: la hoja \"{}\" no llega a la fila {}", hoja, fila_inicio);
        return Ok(());
    }
    let datos = &mut filas[inicio..];
    datos.sort_by_key(|fila| {
        let clave = match Celda::desde_texto(celda(fila, columna)) {
            Celda::Fecha(fecha) => Some(fecha),
            _ => None,
        };
        (clave.is_none(), clave)
    });
    escribir_filas(cfg, hoja, &filas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn cfg_temporal() -> (TempDir, SheetsConfig) {
        let dir = TempDir::new().unwrap();
        let cfg = SheetsConfig {
            dir: dir.path().to_path_buf(),
            ..SheetsConfig::default()
        };
        (dir, cfg)
    }

    fn escribir_hoja(dir: &Path, hoja: &str, contenido: &str) {
        fs::write(dir.join(format!("{}.csv", hoja)), contenido).unwrap();
    }

    const AGENDA: &str = "\
Fecha,Estado,ID,Paciente,Institución,Hora,Médico,Cliente\n\
,,,,,,,\n\
2024-05-10,,2024/05/10-0001,Jane Doe,General Hospital,14:30,Dr. Smith,ACME,,,,,,,,,,Kit A\n";

    #[test]
    fn mapea_la_fila_a_un_registro_tipado() {
        let (dir, cfg) = cfg_temporal();
        escribir_hoja(dir.path(), "Agenda Cx", AGENDA);

        let datos = obtener_datos_fila(&cfg, "Agenda Cx", 3).unwrap();
        assert!(datos.es_completa());
        assert_eq!(datos.paciente, "Jane Doe");
        assert_eq!(datos.id_proyecto, "2024/05/10-0001");
        assert_eq!(datos.material, "Kit A");
        assert!(matches!(datos.fecha_cx, Celda::Fecha(_)));
        assert!(matches!(datos.hora_cx, Celda::Hora(_)));
    }

    #[test]
    fn hoja_inexistente_y_fila_fuera_de_rango() {
        let (dir, cfg) = cfg_temporal();
        assert!(matches!(
            obtener_datos_fila(&cfg, "Nada", 1),
            Err(CxError::HojaNoEncontrada(_))
        ));
        escribir_hoja(dir.path(), "Agenda Cx", AGENDA);
        assert!(matches!(
            obtener_datos_fila(&cfg, "Agenda Cx", 99),
            Err(CxError::FilaInvalida(99, _))
        ));
    }

    #[test]
    fn actualiza_estado_y_formato() {
        let (dir, cfg) = cfg_temporal();
        escribir_hoja(dir.path(), "Agenda Cx", AGENDA);

        assert!(!esta_autorizada(&cfg, "Agenda Cx", 3).unwrap());
        actualizar_estado_cx(&cfg, "Agenda Cx", 3, &cfg.estados.autorizada, None).unwrap();
        assert!(esta_autorizada(&cfg, "Agenda Cx", 3).unwrap());

        formatear_fila_cx(&cfg, "Agenda Cx", 3, &cfg.colores.autorizada).unwrap();
        assert_eq!(
            color_de_fila(&cfg, "Agenda Cx", 3).as_deref(),
            Some("#d9ead3")
        );
    }

    #[test]
    fn una_proteccion_bloquea_a_quien_no_es_editor() {
        use crate::config::Proteccion;
        let (dir, mut cfg) = cfg_temporal();
        escribir_hoja(dir.path(), "Agenda Cx", AGENDA);
        cfg.protecciones.push(Proteccion {
            hoja: "Agenda Cx".to_string(),
            fila_desde: 1,
            fila_hasta: 100,
            columna_desde: 1,
            columna_hasta: 18,
            editores: vec!["dueña@clinica.com".to_string()],
        });

        assert!(!verificar_permisos_edicion(&cfg, "Agenda Cx", 3, None));
        assert!(!verificar_permisos_edicion(&cfg, "Agenda Cx", 3, Some("otro@x.com")));
        assert!(verificar_permisos_edicion(&cfg, "Agenda Cx", 3, Some("dueña@clinica.com")));

        match actualizar_estado_cx(&cfg, "Agenda Cx", 3, "AUTORIZADA", Some("otro@x.com")) {
            Err(CxError::SinPermisos(msg)) => assert!(msg.contains("propietario")),
            otro => panic!("se esperaba SinPermisos, hubo {:?}", otro),
        }
    }

    #[test]
    fn ordena_por_fecha_con_no_fechas_al_final() {
        let (dir, cfg) = cfg_temporal();
        escribir_hoja(
            dir.path(),
            "Agenda Cx",
            "encabezado\n\
             encabezado\n\
             2024-06-01,b\n\
             a confirmar,x\n\
             2024-05-10,a\n",
        );
        ordenar_por_fecha(&cfg, "Agenda Cx", 3, 1).unwrap();
        let filas = leer_filas(&cfg, "Agenda Cx").unwrap();
        assert_eq!(filas[2][0], "2024-05-10");
        assert_eq!(filas[3][0], "2024-06-01");
        assert_eq!(filas[4][0], "a confirmar");
    }

    #[test]
    fn ordenar_rechaza_fila_o_columna_cero() {
        let (dir, cfg) = cfg_temporal();
        escribir_hoja(dir.path(), "Agenda Cx", AGENDA);

        assert!(matches!(
            ordenar_por_fecha(&cfg, "Agenda Cx", 0, 1),
            Err(CxError::FilaInvalida(0, _))
        ));
        assert!(matches!(
            ordenar_por_fecha(&cfg, "Agenda Cx", 3, 0),
            Err(CxError::FilaInvalida(0, _))
        ));
        // La hoja queda intacta.
        let filas = leer_filas(&cfg, "Agenda Cx").unwrap();
        assert_eq!(filas[2][3], "Jane Doe");
    }

    #[test]
    fn una_columna_cero_lee_como_celda_vacia() {
        let fila = vec!["a".to_string(), "b".to_string()];
        assert_eq!(celda(&fila, 0), "");
        assert_eq!(celda(&fila, 1), "a");
    }
}
