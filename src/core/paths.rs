// src/core/paths.rs

use crate::{
    constants::{
        COMMON_SCHEMAS_FILENAME, CONFIG_DIR_ENV, CONFIG_DIR_NAME, CONFIG_FILENAME, ENV_FILENAME,
        TEMPLATES_DIRNAME,
    },
    models::GuardConfig,
};
use lazy_static::lazy_static;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

lazy_static! {
    static ref CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not create directory at '{path}': {source}")]
    DirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to expand path template '{template}': {reason}")]
    Expansion { template: String, reason: String },
}

/// Returns the ociguard configuration directory, creating it if needed.
///
/// `$OCIGUARD_CONFIG_DIR` wins over the platform default
/// (`~/.config/ociguard` on Linux). Memoized after the first call.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    let mut cached = CONFIG_DIR.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    let config_path = match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::config_dir()
            .ok_or(PathError::ConfigDirNotFound)?
            .join(CONFIG_DIR_NAME),
    };

    ensure_dir(&config_path)?;
    *cached = Some(config_path.clone());
    Ok(config_path)
}

/// Returns the path to `config.toml`.
pub fn get_config_file_path() -> Result<PathBuf, PathError> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Expands `~` and `$VAR` in a user-supplied path.
pub fn expand_path_template(template: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template).map_err(|e| PathError::Expansion {
        template: template.to_string(),
        reason: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// The templates directory for `config`, created if missing.
pub fn get_templates_dir(config: &GuardConfig) -> Result<PathBuf, PathError> {
    let dir = match &config.templates_dir {
        Some(template) => expand_path_template(template)?,
        None => get_config_dir()?.join(TEMPLATES_DIRNAME),
    };
    ensure_dir(&dir)?;
    Ok(dunce::simplified(&dir).to_path_buf())
}

/// The env file for `config`. It does not have to exist.
pub fn get_env_file_path(config: &GuardConfig) -> Result<PathBuf, PathError> {
    match &config.env_file {
        Some(template) => expand_path_template(template),
        None => get_config_dir().map(|dir| dir.join(ENV_FILENAME)),
    }
}

/// The common schema document inside a templates directory.
pub fn common_schemas_path(templates_dir: &std::path::Path) -> PathBuf {
    templates_dir.join(COMMON_SCHEMAS_FILENAME)
}

fn ensure_dir(path: &std::path::Path) -> Result<(), PathError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| PathError::DirCreation {
            path: path.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_templates_dir_is_created() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("nested").join("templates");
        let config = GuardConfig {
            templates_dir: Some(target.display().to_string()),
            ..GuardConfig::default()
        };
        let dir = get_templates_dir(&config).unwrap();
        assert!(dir.is_dir());
        assert!(dir.ends_with("nested/templates"));
    }

    #[test]
    fn test_expand_path_template_home() {
        let expanded = expand_path_template("~/x").unwrap();
        assert!(!expanded.starts_with("~"));
    }

    #[test]
    fn test_common_schemas_path() {
        let path = common_schemas_path(std::path::Path::new("/t"));
        assert_eq!(path, PathBuf::from("/t/common_schemas.yaml"));
    }
}
