use serde::Deserialize;
use std::collections::BTreeMap;

/// A form submission event.
///
/// The external platform fires the trigger in one of two shapes: a plain
/// question-title → answers map (`namedValues`), or a structured response
/// object with per-item answers. Both normalize to the same map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EnvioFormulario {
    Nombrado {
        #[serde(rename = "namedValues")]
        named_values: BTreeMap<String, UnaOVarias>,
    },
    Respuesta {
        response: RespuestaFormulario,
    },
}

#[derive(Debug, Deserialize)]
pub struct RespuestaFormulario {
    #[serde(rename = "itemResponses")]
    pub item_responses: Vec<ItemRespuesta>,
}

#[derive(Debug, Deserialize)]
pub struct ItemRespuesta {
    #[serde(rename = "title")]
    pub titulo: String,
    #[serde(rename = "response")]
    pub respuesta: UnaOVarias,
}

/// A single answer may arrive as one string or as a list (multi-file
/// upload questions).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UnaOVarias {
    Una(String),
    Varias(Vec<String>),
}

impl UnaOVarias {
    pub fn en_lista(self) -> Vec<String> {
        match self {
            UnaOVarias::Una(v) => vec![v],
            UnaOVarias::Varias(vs) => vs,
        }
    }
}

impl EnvioFormulario {
    /// Collapses either event shape into question-title → list-of-answers.
    pub fn normalizar(self) -> BTreeMap<String, Vec<String>> {
        match self {
            EnvioFormulario::Nombrado { named_values } => named_values
                .into_iter()
                .map(|(clave, valor)| (clave, valor.en_lista()))
                .collect(),
            EnvioFormulario::Respuesta { response } => response
                .item_responses
                .into_iter()
                .map(|item| (item.titulo, item.respuesta.en_lista()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normaliza_named_values() {
        let json = r#"{"namedValues": {"Paciente": ["Jane"], "Archivos": ["a", "b"]}}"#;
        let envio: EnvioFormulario = serde_json::from_str(json).unwrap();
        let valores = envio.normalizar();
        assert_eq!(valores["Paciente"], vec!["Jane"]);
        assert_eq!(valores["Archivos"], vec!["a", "b"]);
    }

    #[test]
    fn normaliza_item_responses() {
        let json = r#"{"response": {"itemResponses": [
            {"title": "Paciente", "response": "Jane"},
            {"title": "Archivos", "response": ["a", "b"]}
        ]}}"#;
        let envio: EnvioFormulario = serde_json::from_str(json).unwrap();
        let valores = envio.normalizar();
        assert_eq!(valores["Paciente"], vec!["Jane"]);
        assert_eq!(valores["Archivos"], vec!["a", "b"]);
    }
}
