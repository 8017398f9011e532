// src/core/schema_store.rs

use crate::{
    constants::{COMMON_SCHEMAS_FILENAME, TEMPLATE_EXTENSION},
    core::paths,
    models::{Command, Template},
};
use serde_json::{Map, Value};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Filesystem error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Template '{path}' is malformed: {reason}")]
    MalformedTemplate { path: String, reason: String },
    #[error("Common schema document '{path}' is malformed: {reason}")]
    MalformedLibrary { path: String, reason: String },
    #[error("Could not serialize template: {0}")]
    Serialize(String),
    #[error("No template named '{0}'.")]
    NotFound(String),
}

/// How many `$ref` hops one schema may chain through.
const MAX_REF_DEPTH: usize = 16;

/// Why a schema's `$ref`s could not be expanded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefError {
    #[error("$ref '{0}' does not resolve in the common schema document")]
    Unresolved(String),
    #[error("$ref '{0}' refers back to itself")]
    Cycle(String),
    #[error("$ref chain through '{0}' is nested too deeply")]
    TooDeep(String),
}

/// The shared tree of named schema fragments, addressed by dot path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonSchemaLibrary {
    root: Value,
}

impl CommonSchemaLibrary {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Loads the library; a missing or empty file is an empty library.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.is_file() {
            log::debug!("No common schema document at {}", path.display());
            return Ok(Self::default());
        }
        let content = read_file(path)?;
        let root: Value =
            serde_yaml::from_str(&content).map_err(|e| StoreError::MalformedLibrary {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        match root {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => {
                log::debug!("Loaded common schemas from {}", path.display());
                Ok(Self { root })
            }
            _ => Err(StoreError::MalformedLibrary {
                path: path.display().to_string(),
                reason: "top level must be a mapping".to_string(),
            }),
        }
    }

    /// Follows `a.b.c` through nested mappings. Only a mapping counts as a
    /// schema fragment; anything else is treated as unresolvable.
    pub fn resolve(&self, dot_path: &str) -> Option<&Value> {
        if dot_path.is_empty() {
            return None;
        }
        dot_path
            .split('.')
            .try_fold(&self.root, |node, key| node.as_object()?.get(key))
            .filter(|v| v.is_object())
    }

    pub fn contains(&self, dot_path: &str) -> bool {
        self.resolve(dot_path).is_some()
    }

    /// Returns `schema` with every `{"$ref": "<dot.path>"}` replaced by its
    /// library fragment, at any depth, including refs inside fragments.
    ///
    /// Every `$ref` string is a dot path into this library. Keywords next
    /// to a `$ref` are dropped, as draft 7 ignores them.
    pub fn expand(&self, schema: &Value) -> Result<Value, RefError> {
        self.expand_within(schema, &mut Vec::new())
    }

    fn expand_within(&self, schema: &Value, trail: &mut Vec<String>) -> Result<Value, RefError> {
        match schema {
            Value::Object(map) => {
                if let Some(Value::String(target)) = map.get("$ref") {
                    return self.expand_ref(target, trail);
                }
                map.iter()
                    .map(|(key, value)| Ok((key.clone(), self.expand_within(value, trail)?)))
                    .collect::<Result<Map<String, Value>, RefError>>()
                    .map(Value::Object)
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.expand_within(item, trail))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn expand_ref(&self, target: &str, trail: &mut Vec<String>) -> Result<Value, RefError> {
        if trail.iter().any(|seen| seen == target) {
            return Err(RefError::Cycle(target.to_string()));
        }
        if trail.len() >= MAX_REF_DEPTH {
            return Err(RefError::TooDeep(target.to_string()));
        }
        let fragment = self
            .resolve(target)
            .ok_or_else(|| RefError::Unresolved(target.to_string()))?;
        trail.push(target.to_string());
        let expanded = self.expand_within(fragment, trail);
        trail.pop();
        expanded
    }
}

/// A template file found on disk.
#[derive(Debug, Clone)]
pub struct TemplateEntry {
    pub name: String,
    pub path: PathBuf,
    pub template: Result<Template, String>,
}

/// Templates directory + common schema library.
#[derive(Debug, Clone)]
pub struct SchemaStore {
    templates_dir: PathBuf,
    library: CommonSchemaLibrary,
    signature_length: usize,
}

impl SchemaStore {
    /// Opens a templates directory and loads its common schema document.
    pub fn open(templates_dir: &Path, signature_length: usize) -> Result<Self, StoreError> {
        let library = CommonSchemaLibrary::load(&paths::common_schemas_path(templates_dir))?;
        Ok(Self::with_library(templates_dir, library, signature_length))
    }

    pub fn with_library(
        templates_dir: &Path,
        library: CommonSchemaLibrary,
        signature_length: usize,
    ) -> Self {
        Self {
            templates_dir: templates_dir.to_path_buf(),
            library,
            signature_length,
        }
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    pub fn library(&self) -> &CommonSchemaLibrary {
        &self.library
    }

    pub fn signature_length(&self) -> usize {
        self.signature_length
    }

    /// The signature of `command` under this store's signature length.
    pub fn signature<'c>(&self, command: &'c Command) -> Vec<&'c str> {
        command.signature(self.signature_length)
    }

    /// File path for a signature. Tokens are sanitized so the result always
    /// stays inside the templates directory.
    pub fn template_path(&self, signature: &[&str]) -> PathBuf {
        self.templates_dir
            .join(format!("{}.{}", template_key(signature), TEMPLATE_EXTENSION))
    }

    /// Loads the template matching `command`, if one exists.
    ///
    /// `Ok(None)` means "no opinion". A file that exists but cannot be parsed
    /// is an error, never a silent `None`.
    pub fn find_template(&self, command: &Command) -> Result<Option<(PathBuf, Template)>, StoreError> {
        let signature = self.signature(command);
        if signature.is_empty() {
            return Ok(None);
        }
        let path = self.template_path(&signature);
        log::debug!("Looking for template at {}", path.display());
        if !path.is_file() {
            return Ok(None);
        }
        let template = load_template(&path)?;
        Ok(Some((path, template)))
    }

    /// Persists `template` for `signature`, replacing any previous file.
    pub fn save_template(&self, signature: &[&str], template: &Template) -> Result<PathBuf, StoreError> {
        let path = self.template_path(signature);
        let yaml = serde_yaml::to_string(template).map_err(|e| StoreError::Serialize(e.to_string()))?;
        fs::write(&path, yaml).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        log::info!("Saved template {}", path.display());
        Ok(path)
    }

    /// Every template file in the directory, sorted by name. Unparseable
    /// files are listed with their error instead of being skipped.
    pub fn list_templates(&self) -> Result<Vec<TemplateEntry>, StoreError> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.templates_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| StoreError::Io {
                path: self.templates_dir.display().to_string(),
                source: e.into(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_template_file(path) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            entries.push(TemplateEntry {
                name: name.to_string(),
                path: path.to_path_buf(),
                template: load_template(path).map_err(|e| e.to_string()),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Finds a template by file stem (`oci_compute_instance_list`) or by its
    /// space separated signature (`oci compute instance list`).
    pub fn locate(&self, name: &str) -> Result<PathBuf, StoreError> {
        let tokens: Vec<&str> = name.split_whitespace().collect();
        let stem = name.trim().trim_end_matches(".yaml");
        let candidates = [
            self.template_path(&tokens),
            self.template_path(&[stem]),
        ];
        candidates
            .into_iter()
            .find(|p| p.is_file() && is_template_file(p))
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    pub fn delete_template(&self, path: &Path) -> Result<(), StoreError> {
        fs::remove_file(path).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }
}

/// Joins signature tokens with `_`, replacing anything outside
/// `[A-Za-z0-9._-]` so no token can act as a path separator.
pub fn template_key(signature: &[&str]) -> String {
    signature
        .iter()
        .map(|token| {
            token
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("_")
        .trim_start_matches('.')
        .to_string()
}

pub fn load_template(path: &Path) -> Result<Template, StoreError> {
    let content = read_file(path)?;
    serde_yaml::from_str(&content).map_err(|e| StoreError::MalformedTemplate {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn is_template_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(TEMPLATE_EXTENSION)
        && path.file_name().and_then(|n| n.to_str()) != Some(COMMON_SCHEMAS_FILENAME)
}

fn read_file(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|e| StoreError::Io {
        path: path.display().to_string(),
        source: e,
    })
}
