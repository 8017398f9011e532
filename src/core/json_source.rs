// src/core/json_source.rs

use crate::{constants::FILE_URL_PREFIX, core::preflight::local_path};
use serde_json::Value;
use std::fs;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JsonSourceError {
    #[error("The file specified in the command does not exist: {0}")]
    FileNotFound(String),
    #[error("Could not read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Decodes a flag value as JSON, either inline or from a `file://` path.
pub fn load_json_value(value: &str) -> Result<Value, JsonSourceError> {
    if value.starts_with(FILE_URL_PREFIX) {
        let path = local_path(value);
        if !path.is_file() {
            return Err(JsonSourceError::FileNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(&path).map_err(|e| JsonSourceError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        return Ok(serde_json::from_str(&content)?);
    }
    Ok(serde_json::from_str(value)?)
}

/// Describes where a JSON value came from, for prompts.
pub fn source_label(value: &str) -> &'static str {
    if value.starts_with(FILE_URL_PREFIX) {
        "file"
    } else {
        "inline JSON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inline_json() {
        assert_eq!(load_json_value("[1, 2]").unwrap(), json!([1, 2]));
        assert!(matches!(
            load_json_value("not json"),
            Err(JsonSourceError::Parse(_))
        ));
    }

    #[test]
    fn test_file_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, r#"{"ingress": [{"port": 22}]}"#).unwrap();
        let value = load_json_value(&format!("file://{}", path.display())).unwrap();
        assert_eq!(value["ingress"][0]["port"], 22);
        assert_eq!(source_label("file://x"), "file");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_json_value("file:///nope/missing.json"),
            Err(JsonSourceError::FileNotFound(_))
        ));
    }
}
