use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A single cell as read from the tabular store.
///
/// Cells are parsed exactly once at the sheet boundary; everything past
/// that boundary works with this typed value instead of raw strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Celda {
    Fecha(NaiveDate),
    Hora(NaiveTime),
    Texto(String),
    Vacia,
}

impl Celda {
    /// Parses a raw cell string into a typed value.
    ///
    /// Recognized date formats: `yyyy-MM-dd` and `dd/MM/yyyy`.
    /// Recognized time formats: `HH:mm` and `HH:mm:ss`.
    /// Anything else is kept as text; a blank cell becomes `Vacia`.
    pub fn desde_texto(crudo: &str) -> Celda {
        let valor = crudo.trim();
        if valor.is_empty() {
            return Celda::Vacia;
        }
        if let Ok(fecha) = NaiveDate::parse_from_str(valor, "%Y-%m-%d") {
            return Celda::Fecha(fecha);
        }
        if let Ok(fecha) = NaiveDate::parse_from_str(valor, "%d/%m/%Y") {
            return Celda::Fecha(fecha);
        }
        if let Ok(hora) = NaiveTime::parse_from_str(valor, "%H:%M:%S") {
            return Celda::Hora(hora);
        }
        if let Ok(hora) = NaiveTime::parse_from_str(valor, "%H:%M") {
            return Celda::Hora(hora);
        }
        Celda::Texto(valor.to_string())
    }

    pub fn es_vacia(&self) -> bool {
        matches!(self, Celda::Vacia)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsea_fechas_en_ambos_formatos() {
        assert_eq!(
            Celda::desde_texto("2024-05-10"),
            Celda::Fecha(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())
        );
        assert_eq!(
            Celda::desde_texto("10/05/2024"),
            Celda::Fecha(NaiveDate::from_ymd_opt(2024, 5, 10).unwrap())
        );
    }

    #[test]
    fn parsea_horas() {
        assert_eq!(
            Celda::desde_texto("14:30"),
            Celda::Hora(NaiveTime::from_hms_opt(14, 30, 0).unwrap())
        );
        assert_eq!(
            Celda::desde_texto("14:30:15"),
            Celda::Hora(NaiveTime::from_hms_opt(14, 30, 15).unwrap())
        );
    }

    #[test]
    fn texto_y_vacio_pasan_sin_tocar() {
        assert_eq!(
            Celda::desde_texto("a confirmar"),
            Celda::Texto("a confirmar".to_string())
        );
        assert_eq!(Celda::desde_texto("   "), Celda::Vacia);
        assert_eq!(Celda::desde_texto(""), Celda::Vacia);
    }
}
