// FICHIER : migralog/src/utils/json.rs

use crate::utils::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

// --- RE-EXPORTS (Single Source of Truth pour le JSON) ---
pub use serde_json::{json, Map, Value};

/// Parse une chaîne JSON en un type T.
/// Capture un extrait du contenu en cas d'échec pour aider au débogage.
pub fn parse<T: DeserializeOwned>(s: &str) -> Result<T> {
    match serde_json::from_str(s) {
        Ok(val) => Ok(val),
        Err(e) => {
            let snippet = if s.len() > 100 { &s[..100] } else { s };
            tracing::debug!("Échec parsing JSON sur : {}", snippet);
            Err(AppError::Serialization(e))
        }
    }
}

/// Convertit un type T en chaîne JSON compacte.
pub fn stringify<T: Serialize>(v: &T) -> Result<String> {
    serde_json::to_string(v).map_err(AppError::Serialization)
}

/// Convertit un type T en chaîne JSON formatée (pretty).
pub fn stringify_pretty<T: Serialize>(v: &T) -> Result<String> {
    serde_json::to_string_pretty(v).map_err(AppError::Serialization)
}

/// Convertit un `serde_json::Value` en type T.
pub fn from_value<T: DeserializeOwned>(v: Value) -> Result<T> {
    serde_json::from_value(v).map_err(AppError::Serialization)
}

/// Convertit un type T en `serde_json::Value`.
pub fn to_value<T: Serialize>(v: &T) -> Result<Value> {
    serde_json::to_value(v).map_err(AppError::Serialization)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_stringify_roundtrip() {
        let val: Value = parse(r#"{"author":"amalik","id":"orders"}"#).unwrap();
        assert_eq!(val["author"], "amalik");

        let s = stringify(&val).unwrap();
        assert!(s.contains("\"orders\""));
    }

    #[test]
    fn test_parse_invalid_json() {
        let res = parse::<Value>("{ pas du json }");
        assert!(matches!(res, Err(AppError::Serialization(_))));
    }
}
