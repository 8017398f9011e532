// src/core/learner.rs

use crate::{
    constants::{COMMON_ARGS_NAMESPACE, EXIT_PIPELINE_FAILURE, OCID_PREFIX},
    core::{
        arg_parser::ParsedArgs,
        console::Console,
        environment::Environment,
        json_source::{JsonSourceError, load_json_value, source_label},
        prompt::{Confirmer, PromptError},
        resolver::{ResolveError, resolve_variables},
        schema_infer::infer_schema,
        schema_store::{SchemaStore, StoreError},
    },
    models::{ArgSchema, Command, GuardConfig, Template, ValueKind},
    system::executor::CommandRunner,
};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LearnError {
    #[error("{0}")]
    Resolve(#[from] ResolveError),
    #[error("The command failed (exit code {exit_code}); only successful commands can be learned.\n{message}")]
    CommandFailed { exit_code: i32, message: String },
    #[error("The command has no signature to name a template after.")]
    NoSignature,
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Prompt(#[from] PromptError),
}

impl LearnError {
    /// A failed verification run keeps the target's code; anything else is
    /// a local failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CommandFailed { exit_code, .. } => *exit_code,
            _ => EXIT_PIPELINE_FAILURE,
        }
    }
}

/// What a learning session produced.
#[derive(Debug, Clone, PartialEq)]
pub enum LearnOutcome {
    Saved { path: PathBuf, template: Template },
    /// No rules were collected; nothing was written.
    NothingToSave,
    /// A template already existed and the user kept it.
    KeptExisting { path: PathBuf },
}

/// Derives templates from commands that are known to succeed.
pub struct Learner<'a> {
    store: &'a SchemaStore,
    config: &'a GuardConfig,
    env: &'a Environment,
    runner: &'a dyn CommandRunner,
    confirmer: &'a dyn Confirmer,
    console: Console,
}

impl std::fmt::Debug for Learner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Learner")
            .field("store", &self.store.templates_dir())
            .finish()
    }
}

impl<'a> Learner<'a> {
    pub fn new(
        store: &'a SchemaStore,
        config: &'a GuardConfig,
        env: &'a Environment,
        runner: &'a dyn CommandRunner,
        confirmer: &'a dyn Confirmer,
        console: Console,
    ) -> Self {
        Self {
            store,
            config,
            env,
            runner,
            confirmer,
            console,
        }
    }

    /// Resolves and runs `command`, then builds a template from it.
    ///
    /// A failing run aborts before anything is written to disk.
    pub fn learn(&self, command: &Command) -> Result<LearnOutcome, LearnError> {
        self.console.step(t!("learner.info.verifying"));
        let resolved = resolve_variables(command, self.env)?;
        let result = self.runner.run(&resolved);
        if !result.succeeded() {
            return Err(LearnError::CommandFailed {
                exit_code: result.exit_code,
                message: self.console.scrub(&result.error_text()),
            });
        }
        self.console.success(t!("learner.success.verified"));
        self.learn_from_verified(&resolved)
    }

    /// Builds a template from a resolved command that has already succeeded.
    pub fn learn_from_verified(&self, command: &Command) -> Result<LearnOutcome, LearnError> {
        let signature = self.store.signature(command);
        if signature.is_empty() {
            return Err(LearnError::NoSignature);
        }
        let mut template = Template::new(signature.join(" "));
        let parsed = ParsedArgs::new(command);

        self.console.step(t!("learner.header"));
        for arg in parsed.iter() {
            self.console
                .line(&format!(t!("learner.info.flag"), flag = arg.name));

            if self.ask(&format!(t!("learner.prompt.required"), flag = arg.name))? {
                template.required_args.push(arg.name.to_string());
            }

            let Some(value) = arg.value else {
                continue;
            };

            if let Some(ref_path) = self.library_reference(value) {
                let prompt = format!(t!("learner.prompt.common_ref"), path = ref_path);
                if self.ask(&prompt)? {
                    template
                        .arg_schemas
                        .insert(arg.name.to_string(), ArgSchema::Reference { path: ref_path });
                    continue;
                }
            }

            match load_json_value(value) {
                Ok(json) if ValueKind::of(&json).is_structural() => {
                    let prompt = format!(t!("learner.prompt.infer"), source = source_label(value));
                    if self.ask(&prompt)? {
                        let inferred = infer_schema(&json);
                        self.console.line(&format!(
                            t!("learner.info.inferred"),
                            kind = ValueKind::of(&json).schema_type().unwrap_or("any"),
                            flag = arg.name
                        ));
                        template
                            .arg_schemas
                            .insert(arg.name.to_string(), ArgSchema::Inline(inferred));
                    }
                }
                Ok(_) | Err(JsonSourceError::Parse(_)) | Err(JsonSourceError::FileNotFound(_)) => {}
                Err(e) => self.console.warn(&format!(
                    t!("learner.warning.unreadable"),
                    flag = arg.name,
                    error = e
                )),
            }
        }

        for extra in self.config.best_practices_for(&signature) {
            if template.required_args.contains(extra) {
                continue;
            }
            let prompt = format!(
                t!("learner.prompt.best_practice"),
                command = template.command,
                flag = extra
            );
            if self.ask(&prompt)? {
                template.required_args.push(extra.clone());
            }
        }

        if template.is_empty() {
            self.console.warn(t!("learner.warning.empty"));
            return Ok(LearnOutcome::NothingToSave);
        }

        let path = self.store.template_path(&signature);
        if path.exists() {
            let prompt = format!(t!("learner.prompt.overwrite"), path = path.display());
            if !self.ask(&prompt)? {
                return Ok(LearnOutcome::KeptExisting { path });
            }
        }

        let path = self.store.save_template(&signature, &template)?;
        self.console
            .success(&format!(t!("learner.success.saved"), path = path.display()));
        Ok(LearnOutcome::Saved { path, template })
    }

    /// `ocid1.<kind>.…` -> `common_oci_args.<kind>_id`, if the library has it.
    fn library_reference(&self, value: &str) -> Option<String> {
        let kind = value
            .strip_prefix(OCID_PREFIX)?
            .split('.')
            .next()
            .filter(|k| !k.is_empty())?;
        let ref_path = format!("{}.{}_id", COMMON_ARGS_NAMESPACE, kind);
        self.store.library().contains(&ref_path).then_some(ref_path)
    }

    fn ask(&self, prompt: &str) -> Result<bool, PromptError> {
        self.confirmer.confirm(prompt, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::COMMON_SCHEMAS_FILENAME,
        core::{prompt::ScriptedConfirmer, schema_store::load_template},
        models::ExecutionResult,
        system::executor::ScriptedRunner,
    };
    use serde_json::json;
    use std::fs;

    const COMMON: &str = "common_oci_args:\n  compartment_id:\n    type: string\n    pattern: '^ocid1\\.compartment\\.'\n";

    fn store(dir: &std::path::Path) -> SchemaStore {
        fs::write(dir.join(COMMON_SCHEMAS_FILENAME), COMMON).unwrap();
        SchemaStore::open(dir, 4).unwrap()
    }

    fn ok() -> ExecutionResult {
        ExecutionResult {
            exit_code: 0,
            stdout: "{}".to_string(),
            stderr: String::new(),
        }
    }

    fn no_best_practices() -> GuardConfig {
        GuardConfig {
            best_practices: Default::default(),
            ..GuardConfig::default()
        }
    }

    #[test]
    fn test_offers_common_ref_for_ocid() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let config = no_best_practices();
        let env = Environment::default();
        let runner = ScriptedRunner::new(vec![ok()]);
        // required? yes; use $ref? yes
        let confirmer = ScriptedConfirmer::new(&[true, true]);
        let learner = Learner::new(&store, &config, &env, &runner, &confirmer, Console::quiet());

        let command = Command::from(
            &[
                "oci", "compute", "instance", "list", "--compartment-id",
                "ocid1.compartment.oc1..example",
            ][..],
        );
        let outcome = learner.learn(&command).unwrap();

        let asked = confirmer.asked();
        assert!(asked[1].contains("$ref: common_oci_args.compartment_id"));
        match outcome {
            LearnOutcome::Saved { path, template } => {
                assert_eq!(template.command, "oci compute instance list");
                assert_eq!(template.required_args, vec!["--compartment-id"]);
                assert_eq!(
                    template.arg_schemas.get("--compartment-id"),
                    Some(&ArgSchema::Reference {
                        path: "common_oci_args.compartment_id".to_string()
                    })
                );
                assert_eq!(load_template(&path).unwrap(), template);
            }
            other => panic!("expected a saved template, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_ocid_kind_is_not_offered_as_ref() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let config = no_best_practices();
        let env = Environment::default();
        let runner = ScriptedRunner::new(vec![]);
        let confirmer = ScriptedConfirmer::new(&[false]);
        let learner = Learner::new(&store, &config, &env, &runner, &confirmer, Console::quiet());

        let command = Command::from(&["oci", "network", "vcn", "get", "--vcn-id", "ocid1.vcn.oc1.iad.abc"][..]);
        let outcome = learner.learn_from_verified(&command).unwrap();
        assert_eq!(outcome, LearnOutcome::NothingToSave);
        assert_eq!(confirmer.asked().len(), 1);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_infers_schema_from_inline_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let config = no_best_practices();
        let env = Environment::default();
        let runner = ScriptedRunner::new(vec![]);
        // required? no; infer? yes
        let confirmer = ScriptedConfirmer::new(&[false, true]);
        let learner = Learner::new(&store, &config, &env, &runner, &confirmer, Console::quiet());

        let command = Command::from(
            &["oci", "os", "bucket", "create", "--freeform-tags", r#"{"team": "infra"}"#][..],
        );
        let LearnOutcome::Saved { template, .. } = learner.learn_from_verified(&command).unwrap() else {
            panic!("expected a saved template");
        };
        assert_eq!(
            template.arg_schemas.get("--freeform-tags"),
            Some(&ArgSchema::Inline(json!({
                "type": "object",
                "properties": { "team": { "type": "string" } }
            })))
        );
        assert!(template.required_args.is_empty());
    }

    #[test]
    fn test_failed_command_aborts_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let config = no_best_practices();
        let env = Environment::default();
        let runner = ScriptedRunner::new(vec![ExecutionResult {
            exit_code: 2,
            stdout: String::new(),
            stderr: "Error: Missing option(s) --compartment-id.".to_string(),
        }]);
        let confirmer = ScriptedConfirmer::new(&[true, true, true]);
        let learner = Learner::new(&store, &config, &env, &runner, &confirmer, Console::quiet());

        let command = Command::from(&["oci", "compute", "instance", "list", "--all"][..]);
        let err = learner.learn(&command).unwrap_err();
        assert!(matches!(err, LearnError::CommandFailed { exit_code: 2, .. }));
        assert!(confirmer.asked().is_empty());
        assert!(store.list_templates().unwrap().is_empty());
    }

    #[test]
    fn test_unresolved_variable_aborts_before_running() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let config = no_best_practices();
        let env = Environment::default();
        let runner = ScriptedRunner::new(vec![]);
        let confirmer = ScriptedConfirmer::new(&[]);
        let learner = Learner::new(&store, &config, &env, &runner, &confirmer, Console::quiet());

        let command = Command::from(&["oci", "iam", "user", "list", "--compartment-id", "$NOPE"][..]);
        assert!(matches!(learner.learn(&command), Err(LearnError::Resolve(_))));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_best_practice_flags_are_offered() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let config = GuardConfig::default();
        let env = Environment::default();
        let runner = ScriptedRunner::new(vec![]);
        // --bucket-name required? yes; then best practices: --bucket-name is
        // skipped, --content-type? yes
        let confirmer = ScriptedConfirmer::new(&[true, true]);
        let learner = Learner::new(&store, &config, &env, &runner, &confirmer, Console::quiet());

        let command = Command::from(&["oci", "os", "object", "put", "--bucket-name", "b"][..]);
        let LearnOutcome::Saved { template, .. } = learner.learn_from_verified(&command).unwrap() else {
            panic!("expected a saved template");
        };
        assert_eq!(template.required_args, vec!["--bucket-name", "--content-type"]);
        assert_eq!(confirmer.asked().len(), 2);
    }

    #[test]
    fn test_existing_template_is_kept_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let config = no_best_practices();
        let env = Environment::default();
        let runner = ScriptedRunner::new(vec![]);
        let command = Command::from(&["oci", "iam", "user", "list", "--all"][..]);
        fs::write(store.template_path(&store.signature(&command)), "command: old\n").unwrap();

        // required? yes; overwrite? (falls back to default: no)
        let confirmer = ScriptedConfirmer::new(&[true]);
        let learner = Learner::new(&store, &config, &env, &runner, &confirmer, Console::quiet());
        let outcome = learner.learn_from_verified(&command).unwrap();
        assert!(matches!(outcome, LearnOutcome::KeptExisting { .. }));
        let (_, kept) = store.find_template(&command).unwrap().unwrap();
        assert_eq!(kept.command, "old");
    }
}
