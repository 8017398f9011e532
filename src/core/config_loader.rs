//! # Config Loader
//!
//! Loads `config.toml` from the ociguard configuration directory. A missing
//! file is written out with the defaults on first use so the knowledge tables
//! (best practices, broadening hints) are discoverable and editable.
use crate::{core::paths, models::GuardConfig};
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Path Error: {0}")]
    Path(#[from] paths::PathError),
    #[error("Could not read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Config file '{path}' is malformed: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Could not write default config: {0}")]
    Write(String),
}

/// Loads the user configuration from the standard location.
pub fn load_config() -> Result<GuardConfig, ConfigError> {
    let path = paths::get_config_file_path()?;
    if !path.exists() {
        let default_config = GuardConfig::default();
        if let Err(e) = write_default_config(&path, &default_config) {
            // Not fatal: the defaults are still usable in memory.
            log::warn!("{}", e);
        }
        return Ok(default_config);
    }
    load_config_from(&path)
}

/// Loads and parses a specific config file.
pub fn load_config_from(path: &Path) -> Result<GuardConfig, ConfigError> {
    log::debug!("Loading config from {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut config: GuardConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        source: e,
    })?;
    if config.signature_length == 0 {
        log::warn!("signature_length = 0 is not usable; falling back to the default.");
        config.signature_length = GuardConfig::default().signature_length;
    }
    Ok(config)
}

fn write_default_config(path: &Path, config: &GuardConfig) -> Result<(), ConfigError> {
    let toml_string =
        toml::to_string_pretty(config).map_err(|e| ConfigError::Write(e.to_string()))?;
    fs::write(path, toml_string).map_err(|e| ConfigError::Write(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "signature_length = 3\n\n[broadening_hints]\n\"oci bv volume list\" = [\"--all\"]\n",
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.signature_length, 3);
        assert_eq!(config.pager_env_var, "PAGER");
        assert_eq!(
            config.broadening_hint_for(&["oci", "bv", "volume", "list"]),
            &["--all".to_string()]
        );
        assert!(config.file_path_flags.contains(&"--from-json".to_string()));
    }

    #[test]
    fn test_malformed_config_is_loud() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "signature_length = \"four\"").unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        write_default_config(&path, &GuardConfig::default()).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), GuardConfig::default());
    }
}
