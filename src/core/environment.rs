// src/core/environment.rs

use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("Could not read env file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: dotenvy::Error,
    },
}

/// A read-only snapshot of variable name -> value for one invocation.
///
/// Names iterate in lexicographic order; every "first match" search in the
/// pipeline relies on that order being stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Builds the merged view: the env file first, then the process environment
    /// on top. The process environment itself is never modified.
    pub fn load(env_file: Option<&Path>) -> Result<Self, EnvironmentError> {
        let mut vars = BTreeMap::new();

        if let Some(path) = env_file.filter(|p| p.is_file()) {
            log::debug!("Loading env file: {}", path.display());
            let entries = dotenvy::from_path_iter(path).map_err(|e| EnvironmentError::Read {
                path: path.display().to_string(),
                source: e,
            })?;
            for entry in entries {
                let (key, value) = entry.map_err(|e| EnvironmentError::Read {
                    path: path.display().to_string(),
                    source: e,
                })?;
                vars.insert(key, value);
            }
        }

        // Non-UTF-8 entries cannot be referenced from a command anyway.
        vars.extend(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        );
        Ok(Self { vars })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// All variable names containing `key` as an exact substring, in order.
    pub fn names_containing(&self, key: &str) -> Vec<&str> {
        if key.is_empty() {
            return Vec::new();
        }
        self.vars
            .keys()
            .filter(|name| name.contains(key))
            .map(String::as_str)
            .collect()
    }

    /// The first `(name, value)` whose name contains `key`.
    pub fn first_containing(&self, key: &str) -> Option<(&str, &str)> {
        if key.is_empty() {
            return None;
        }
        self.vars
            .iter()
            .find(|(name, _)| name.contains(key))
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}
