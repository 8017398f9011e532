// src/core/resolver.rs

use crate::{core::environment::Environment, models::Command};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Environment variable '{name}' is not defined.")]
    Unresolved { name: String },
}

/// Returns the bare variable name if `token` is a variable reference.
///
/// Accepted forms: `$NAME`, `${NAME}`, and either of those wrapped in single or
/// double quotes (for tokens that reached us still quoted).
pub fn variable_name(token: &str) -> Option<&str> {
    let unquoted = token.trim_matches(|c| c == '\'' || c == '"');
    let rest = unquoted.strip_prefix('$')?;
    let name = rest
        .strip_prefix('{')
        .and_then(|r| r.strip_suffix('}'))
        .unwrap_or(rest);
    if name.is_empty() { None } else { Some(name) }
}

/// Substitutes every `$NAME` token in `command` with its value from `env`.
///
/// Lookup is exact. The first undefined name aborts resolution; no similar
/// names are ever considered, so a `$PROD_...` typo can never quietly pick up
/// a `$DEV_...` value.
pub fn resolve_variables(command: &Command, env: &Environment) -> Result<Command, ResolveError> {
    let mut resolved = Vec::with_capacity(command.tokens().len());

    for token in command.tokens() {
        match variable_name(token) {
            Some(name) => {
                let value = env.get(name).ok_or_else(|| ResolveError::Unresolved {
                    name: name.to_string(),
                })?;
                log::trace!("Resolved ${}", name);
                resolved.push(expand_value(value));
            }
            None => resolved.push(token.clone()),
        }
    }

    Ok(Command::new(resolved))
}

/// JSON values pass through untouched; anything else gets a leading `~` expanded.
fn expand_value(value: &str) -> String {
    if serde_json::from_str::<serde_json::Value>(value).is_ok() {
        return value.to_string();
    }
    shellexpand::tilde(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(tokens: &[&str]) -> Command {
        Command::from(tokens)
    }

    #[test]
    fn test_variable_name_forms() {
        assert_eq!(variable_name("$FOO"), Some("FOO"));
        assert_eq!(variable_name("${FOO}"), Some("FOO"));
        assert_eq!(variable_name("'$FOO'"), Some("FOO"));
        assert_eq!(variable_name("\"${FOO}\""), Some("FOO"));
        assert_eq!(variable_name("FOO"), None);
        assert_eq!(variable_name("$"), None);
        assert_eq!(variable_name("--flag"), None);
    }

    #[test]
    fn test_resolves_known_variables() {
        let env = Environment::from_pairs([("COMP", "ocid1.compartment.oc1..x")]);
        let command = cmd(&["oci", "instance", "list", "--compartment-id", "$COMP"]);
        let resolved = resolve_variables(&command, &env).unwrap();
        assert_eq!(
            resolved.tokens().last().map(String::as_str),
            Some("ocid1.compartment.oc1..x")
        );
        // The input command is left as it was.
        assert_eq!(command.tokens().last().map(String::as_str), Some("$COMP"));
    }

    #[test]
    fn test_unresolved_fails_without_suggestions() {
        // A near-identical name exists; it must not be used.
        let env = Environment::from_pairs([("COMPARTMENT_ID", "x"), ("COMPARTMENT_IDS", "y")]);
        let command = cmd(&["list", "--compartment-id", "$COMPARTMENT_lD"]);
        let err = resolve_variables(&command, &env).unwrap_err();
        assert_eq!(
            err,
            ResolveError::Unresolved {
                name: "COMPARTMENT_lD".to_string()
            }
        );
    }

    #[test]
    fn test_first_unresolved_is_reported() {
        let env = Environment::default();
        let command = cmd(&["oci", "$FIRST", "$SECOND"]);
        let err = resolve_variables(&command, &env).unwrap_err();
        assert!(err.to_string().contains("FIRST"));
    }

    #[test]
    fn test_home_expansion_for_paths_only() {
        let env = Environment::from_pairs([
            ("KEY_FILE", "~/.ssh/id_rsa.pub"),
            ("JSON", "{\"a\": \"~/x\"}"),
        ]);
        let resolved = resolve_variables(&cmd(&["$KEY_FILE", "$JSON"]), &env).unwrap();
        let tokens = resolved.tokens();
        assert!(!tokens[0].starts_with('~'));
        assert!(tokens[0].ends_with(".ssh/id_rsa.pub"));
        assert_eq!(tokens[1], "{\"a\": \"~/x\"}");
    }
}
