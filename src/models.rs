// src/models.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{
    DEFAULT_FILE_PATH_FLAGS, DEFAULT_PAGER_ENV_VAR, DEFAULT_PAGER_VALUE,
    DEFAULT_SIGNATURE_LENGTH,
};

// --- COMMANDS ---

/// An ordered sequence of command tokens, flags and values interleaved.
///
/// A `Command` is never edited in place: resolution, fix injection and scope
/// broadening each build a new value from the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    tokens: Vec<String>,
}

impl Command {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The program to spawn (the first token).
    pub fn program(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Everything after the program.
    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    /// Returns `true` if `flag` appears anywhere in the command.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.tokens.iter().any(|t| t == flag)
    }

    /// Returns a new command with `extra` appended.
    pub fn extended<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = self.tokens.clone();
        tokens.extend(extra.into_iter().map(Into::into));
        Self { tokens }
    }

    /// Returns a new command with `flag value` appended.
    pub fn with_flag(&self, flag: &str, value: &str) -> Self {
        self.extended([flag, value])
    }

    /// The first `length` tokens that are not flags. Flag values count too,
    /// so the signature is only meaningful when the leading tokens are the
    /// command path (`oci compute instance list ...`).
    pub fn signature(&self, length: usize) -> Vec<&str> {
        self.tokens
            .iter()
            .filter(|t| !t.starts_with("--"))
            .take(length)
            .map(String::as_str)
            .collect()
    }

    /// Shell-quoted rendering, suitable for copying back into a terminal.
    pub fn display_line(&self) -> String {
        shlex::try_join(self.tokens.iter().map(String::as_str))
            .unwrap_or_else(|_| self.tokens.join(" "))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_line())
    }
}

impl From<Vec<String>> for Command {
    fn from(tokens: Vec<String>) -> Self {
        Self::new(tokens)
    }
}

impl From<&[&str]> for Command {
    fn from(tokens: &[&str]) -> Self {
        Self::new(tokens.iter().map(|s| s.to_string()).collect())
    }
}

// --- TEMPLATES ---

/// A validation rule set for one command signature, stored as one YAML file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Template {
    /// Display signature, e.g. `oci compute instance list`.
    pub command: String,
    #[serde(default)]
    pub required_args: Vec<String>,
    #[serde(default)]
    pub arg_schemas: BTreeMap<String, ArgSchema>,
}

impl Template {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            required_args: Vec::new(),
            arg_schemas: BTreeMap::new(),
        }
    }

    /// A template with no rules has nothing to say and is never persisted.
    pub fn is_empty(&self) -> bool {
        self.required_args.is_empty() && self.arg_schemas.is_empty()
    }
}

/// The schema attached to one flag: either a pointer into the common schema
/// library or an inline JSON-Schema fragment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ArgSchema {
    Reference {
        #[serde(rename = "$ref")]
        path: String,
    },
    Inline(Value),
}

// --- EXECUTION ---

/// The outcome of one subprocess run. Retries produce a fresh result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// Successful but with nothing on stdout.
    pub fn is_empty_success(&self) -> bool {
        self.succeeded() && self.stdout.trim().is_empty()
    }

    /// Combined error text (stderr first), trimmed.
    pub fn error_text(&self) -> String {
        format!("{}\n{}", self.stderr.trim(), self.stdout.trim())
            .trim()
            .to_string()
    }
}

/// A single deterministic remediation: add `missing_flag` using the value of
/// `source_variable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixSuggestion {
    pub missing_flag: String,
    pub source_variable: String,
}

// --- SCHEMA INFERENCE ---

/// The closed set of JSON value kinds the learner knows how to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
    Null,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::String(_) => Self::String,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Null => Self::Null,
        }
    }

    /// The JSON-Schema `type` keyword for this kind, if it has one.
    pub fn schema_type(self) -> Option<&'static str> {
        match self {
            Self::Object => Some("object"),
            Self::Array => Some("array"),
            Self::String => Some("string"),
            Self::Integer => Some("integer"),
            Self::Number => Some("number"),
            Self::Boolean => Some("boolean"),
            Self::Null => None,
        }
    }

    /// Object and array values are worth a structural schema.
    pub fn is_structural(self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }
}

// --- CONFIGURATION ---

/// User configuration loaded from `config.toml`. Every field has a default,
/// so a missing file is equivalent to an empty one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GuardConfig {
    /// Directory holding templates and the common schema document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<String>,
    /// Local key=value file merged under the process environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_file: Option<String>,
    pub signature_length: usize,
    pub file_path_flags: Vec<String>,
    pub pager_env_var: String,
    pub pager_value: String,
    /// Signature (space separated) -> flags worth requiring.
    pub best_practices: BTreeMap<String, Vec<String>>,
    /// Signature (space separated) -> extra tokens that widen an empty listing.
    pub broadening_hints: BTreeMap<String, Vec<String>>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        let mut best_practices = BTreeMap::new();
        best_practices.insert(
            "oci compute instance launch".to_string(),
            vec![
                "--display-name".to_string(),
                "--availability-domain".to_string(),
                "--shape".to_string(),
            ],
        );
        best_practices.insert(
            "oci os object put".to_string(),
            vec!["--bucket-name".to_string(), "--content-type".to_string()],
        );
        best_practices.insert(
            "oci network vcn create".to_string(),
            vec!["--display-name".to_string(), "--cidr-blocks".to_string()],
        );

        let mut broadening_hints = BTreeMap::new();
        broadening_hints.insert(
            "oci compute instance list".to_string(),
            vec!["--all".to_string()],
        );
        broadening_hints.insert(
            "oci iam compartment list".to_string(),
            vec![
                "--compartment-id-in-subtree".to_string(),
                "true".to_string(),
            ],
        );
        broadening_hints.insert(
            "oci os object list".to_string(),
            vec!["--all".to_string()],
        );

        Self {
            templates_dir: None,
            env_file: None,
            signature_length: DEFAULT_SIGNATURE_LENGTH,
            file_path_flags: DEFAULT_FILE_PATH_FLAGS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            pager_env_var: DEFAULT_PAGER_ENV_VAR.to_string(),
            pager_value: DEFAULT_PAGER_VALUE.to_string(),
            best_practices,
            broadening_hints,
        }
    }
}

impl GuardConfig {
    pub fn best_practices_for(&self, signature: &[&str]) -> &[String] {
        self.best_practices
            .get(&signature.join(" "))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn broadening_hint_for(&self, signature: &[&str]) -> &[String] {
        self.broadening_hints
            .get(&signature.join(" "))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
