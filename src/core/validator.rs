// src/core/validator.rs

use crate::{
    core::{
        arg_parser::{ParsedArgs, env_search_key},
        console::Console,
        environment::Environment,
        json_source::load_json_value,
        prompt::{Confirmer, PromptError},
        schema_store::{SchemaStore, StoreError},
    },
    models::{ArgSchema, Command, Template},
};
use jsonschema::JSONSchema;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How many schema violations are reported for one argument.
const MAX_REPORTED_VIOLATIONS: usize = 3;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("missing required argument {flag}")]
    MissingArgument { flag: String },
    #[error("invalid value for '{flag}': {reason}")]
    InvalidArgument { flag: String, reason: String },
    #[error("template '{path}' is malformed: {reason}")]
    MalformedTemplate { path: String, reason: String },
    #[error("{0}")]
    Store(StoreError),
    #[error("{0}")]
    Prompt(#[from] PromptError),
}

impl From<StoreError> for ValidationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MalformedTemplate { path, reason }
            | StoreError::MalformedLibrary { path, reason } => Self::MalformedTemplate { path, reason },
            other => Self::Store(other),
        }
    }
}

/// Whether a template had an opinion about the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationStatus {
    /// No template matches; the command runs unchecked.
    NoTemplate,
    /// A template matched and every rule passed.
    Valid { template_path: PathBuf },
}

/// A passed validation plus the command to execute, which may carry flags
/// injected during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub status: ValidationStatus,
    pub command: Command,
}

/// Checks resolved commands against the template store.
pub struct Validator<'a> {
    store: &'a SchemaStore,
    env: &'a Environment,
    confirmer: &'a dyn Confirmer,
    interactive: bool,
    console: Console,
}

impl std::fmt::Debug for Validator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("store", &self.store.templates_dir())
            .field("interactive", &self.interactive)
            .finish()
    }
}

impl<'a> Validator<'a> {
    pub fn new(
        store: &'a SchemaStore,
        env: &'a Environment,
        confirmer: &'a dyn Confirmer,
        interactive: bool,
        console: Console,
    ) -> Self {
        Self {
            store,
            env,
            confirmer,
            interactive,
            console,
        }
    }

    /// Validates `command` against its template, if any.
    ///
    /// Order of checks:
    /// 1. every `$ref` in the template must resolve (a rotten template fails
    ///    for any matching command, whatever flags it carries);
    /// 2. every required argument must be present, or be injected after an
    ///    explicit confirmation;
    /// 3. every present argument with a schema must validate.
    pub fn validate(&self, command: &Command) -> Result<Validation, ValidationError> {
        let Some((path, template)) = self.store.find_template(command)? else {
            log::debug!("No template for this command signature.");
            return Ok(Validation {
                status: ValidationStatus::NoTemplate,
                command: command.clone(),
            });
        };
        self.console.success(&format!(
            t!("validator.success.found"),
            command = template.command
        ));

        let schemas = self.resolve_schemas(&template, &path)?;
        let command = self.check_required(&template, command)?;

        let parsed = ParsedArgs::new(&command);
        for (flag, schema) in &schemas {
            if let Some(value) = parsed.get(flag) {
                validate_argument(flag, value, schema, &path)?;
            }
        }

        self.console.success(t!("validator.success.passed"));
        Ok(Validation {
            status: ValidationStatus::Valid {
                template_path: path,
            },
            command,
        })
    }

    /// Expands every `$ref` in the template, nested ones included, into the
    /// library fragment it points to. Any miss fails the whole template.
    fn resolve_schemas(
        &self,
        template: &Template,
        path: &Path,
    ) -> Result<Vec<(String, Value)>, ValidationError> {
        let malformed = |reason: String| ValidationError::MalformedTemplate {
            path: path.display().to_string(),
            reason,
        };
        template
            .arg_schemas
            .iter()
            .map(|(flag, schema)| {
                let raw = match schema {
                    ArgSchema::Reference { path: ref_path } => json!({ "$ref": ref_path }),
                    ArgSchema::Inline(value) if value.is_object() => value.clone(),
                    ArgSchema::Inline(_) => {
                        return Err(malformed(format!("schema for '{}' is not a mapping", flag)));
                    }
                };
                let resolved = self
                    .store
                    .library()
                    .expand(&raw)
                    .map_err(|e| malformed(format!("schema for '{}': {}", flag, e)))?;
                Ok((flag.clone(), resolved))
            })
            .collect()
    }

    /// Ensures required flags are present, offering a confirmed injection
    /// from the environment when exactly one candidate variable exists.
    fn check_required(&self, template: &Template, command: &Command) -> Result<Command, ValidationError> {
        let mut current = command.clone();

        for required in &template.required_args {
            if ParsedArgs::new(&current).contains(required) {
                continue;
            }
            self.console
                .warn(&format!(t!("validator.warning.missing"), flag = required));

            match self.injection_candidate(required) {
                Some(var) if self.interactive => {
                    let prompt = format!(t!("validator.prompt.inject"), var = var, flag = required);
                    if self.confirmer.confirm(&prompt, false)? {
                        let value = self.env.get(var).unwrap_or_default();
                        self.console.line(&format!(
                            t!("validator.info.injecting"),
                            flag = required,
                            var = var
                        ));
                        log::info!("Injected {} from ${}", required, var);
                        current = current.with_flag(required, value);
                        continue;
                    }
                }
                _ => {}
            }

            return Err(ValidationError::MissingArgument {
                flag: required.clone(),
            });
        }

        Ok(current)
    }

    /// The variable that may stand in for `flag`: an exact name match wins;
    /// otherwise the single name containing the normalized key. Several
    /// scoped candidates (e.g. `DEV_` and `PROD_`) are ambiguous and yield
    /// nothing.
    fn injection_candidate(&self, flag: &str) -> Option<&'a str> {
        let key = env_search_key(flag);
        let candidates = self.env.names_containing(&key);
        if let Some(exact) = candidates.iter().find(|name| **name == key) {
            return Some(*exact);
        }
        match candidates.as_slice() {
            [single] => Some(*single),
            [] => None,
            several => {
                self.console.line(&format!(
                    t!("validator.info.ambiguous"),
                    flag = flag,
                    names = several.join(", ")
                ));
                None
            }
        }
    }
}

/// Validates one flag value against its (already resolved) schema.
pub fn validate_argument(
    flag: &str,
    value: Option<&str>,
    schema: &Value,
    template_path: &Path,
) -> Result<(), ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidArgument {
        flag: flag.to_string(),
        reason,
    };

    let schema_type = schema.get("type").and_then(Value::as_str);
    let instance = match (value, schema_type) {
        (None, Some("boolean")) => Value::Bool(true),
        (None, _) => {
            return Err(invalid(
                "expected a value, but none was provided".to_string(),
            ));
        }
        (Some(raw), Some("object" | "array")) => {
            load_json_value(raw).map_err(|e| invalid(e.to_string()))?
        }
        (Some(raw), Some("integer" | "number" | "boolean")) => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        }
        (Some(raw), _) => Value::String(raw.to_string()),
    };

    let compiled = JSONSchema::compile(schema).map_err(|e| ValidationError::MalformedTemplate {
        path: template_path.display().to_string(),
        reason: format!("schema for '{}' is invalid: {}", flag, e),
    })?;

    let violations: Vec<String> = match compiled.validate(&instance) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .take(MAX_REPORTED_VIOLATIONS)
            .map(|e| e.to_string())
            .collect(),
    };
    if violations.is_empty() {
        return Ok(());
    }

    let mut reason = violations.join("; ");
    if let (Some(_), Some(hint)) = (
        schema.get("pattern"),
        schema.get("description").and_then(Value::as_str),
    ) {
        reason.push_str(&format!(" (hint: {})", hint));
    }
    Err(invalid(reason))
}
