// src/core/preflight.rs

use crate::{constants::FILE_URL_PREFIX, models::Command};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreflightError {
    #[error("The file specified for '{flag}' does not exist: '{path}'")]
    FileMissing { flag: String, path: String },
}

/// Checks that every file referenced by a known file-path flag exists locally.
///
/// This runs before the target CLI is invoked so a typo in a path never costs
/// a network round-trip. A `file://` prefix (as used by `--from-json`) is
/// stripped before the check. A flag in last position has no path to check.
pub fn check_file_paths(command: &Command, file_path_flags: &[String]) -> Result<(), PreflightError> {
    let tokens = command.tokens();

    for (flag, value) in tokens.iter().zip(tokens.iter().skip(1)) {
        if !file_path_flags.iter().any(|f| f == flag) {
            continue;
        }
        let path = local_path(value);
        log::debug!("Pre-flight check for {}: {}", flag, path.display());
        if !path.is_file() {
            return Err(PreflightError::FileMissing {
                flag: flag.clone(),
                path: value.clone(),
            });
        }
    }

    Ok(())
}

/// Turns a flag value into the local path it names.
pub fn local_path(value: &str) -> PathBuf {
    let raw = value.strip_prefix(FILE_URL_PREFIX).unwrap_or(value);
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
