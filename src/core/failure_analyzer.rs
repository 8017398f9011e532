// src/core/failure_analyzer.rs

use crate::{
    core::{arg_parser::env_search_key, environment::Environment},
    models::FixSuggestion,
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Phrasings the target CLI uses for "you forgot a required option".
    static ref MISSING_OPTION_RES: Vec<Regex> = [
        r"Missing option\(s\)\s+(--[a-zA-Z0-9-]+)",
        r"Missing required parameter\s+(--[a-zA-Z0-9-]+)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect();
}

/// Extracts the missing flag from a "missing required option" error.
pub fn missing_option(stderr: &str) -> Option<&str> {
    MISSING_OPTION_RES
        .iter()
        .find_map(|re| re.captures(stderr))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Proposes at most one fix for a failed run.
///
/// Only the "missing required option" class is recognized. The fix names the
/// first variable (in name order) whose name contains the normalized flag,
/// e.g. `--compartment-id` -> `*COMPARTMENT_ID*`. Anything else yields `None`
/// and the failure is reported as-is.
pub fn analyze_failure(stderr: &str, env: &Environment) -> Option<FixSuggestion> {
    let missing_flag = missing_option(stderr)?;
    let key = env_search_key(missing_flag);
    let (variable, _) = env.first_containing(&key)?;
    log::debug!("Failure analysis: {} may come from ${}", missing_flag, variable);
    Some(FixSuggestion {
        missing_flag: missing_flag.to_string(),
        source_variable: variable.to_string(),
    })
}
