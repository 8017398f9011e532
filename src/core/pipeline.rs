// src/core/pipeline.rs

use crate::{
    constants::EXIT_PIPELINE_FAILURE,
    core::{
        console::Console,
        environment::{Environment, EnvironmentError},
        failure_analyzer::analyze_failure,
        learner::{LearnOutcome, Learner},
        preflight::{PreflightError, check_file_paths},
        prompt::{Confirmer, PromptError},
        redactor::redact,
        resolver::{ResolveError, resolve_variables},
        schema_store::{SchemaStore, StoreError},
        validator::{ValidationError, ValidationStatus, Validator},
    },
    dev_utils::BlockTimer,
    models::{Command, ExecutionResult, GuardConfig},
    system::executor::CommandRunner,
};
use thiserror::Error;

/// Why a pipeline run ended without a successful command.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{0}")]
    VariableUnresolved(#[from] ResolveError),
    #[error("{0}")]
    PreflightFileMissing(#[from] PreflightError),
    #[error("template '{path}' is malformed: {reason}")]
    TemplateMalformed { path: String, reason: String },
    #[error("{0}")]
    ValidationFailed(ValidationError),
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Environment(#[from] EnvironmentError),
    #[error("{0}")]
    Prompt(#[from] PromptError),
    /// The target CLI ran and the failure was not recovered. `command` is
    /// already redacted.
    #[error("the command failed with exit code {code}: {command}")]
    TargetFailed { code: i32, command: String },
}

impl From<ValidationError> for PipelineError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::MalformedTemplate { path, reason } => {
                Self::TemplateMalformed { path, reason }
            }
            ValidationError::Store(e) => Self::Store(e),
            ValidationError::Prompt(e) => Self::Prompt(e),
            other => Self::ValidationFailed(other),
        }
    }
}

impl PipelineError {
    /// The stage that raised the error, for user-facing reports.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::VariableUnresolved(_) | Self::Environment(_) => "resolve",
            Self::PreflightFileMissing(_) => "pre-flight",
            Self::TemplateMalformed { .. } | Self::ValidationFailed(_) | Self::Store(_) => {
                "validate"
            }
            Self::Prompt(_) => "prompt",
            Self::TargetFailed { .. } => "execute",
        }
    }

    /// Pipeline-local failures share one code; a failed target keeps its own.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TargetFailed { code, .. } => *code,
            _ => EXIT_PIPELINE_FAILURE,
        }
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub status: ValidationStatus,
    /// The command that produced `result`, after any injection or retry.
    pub executed: Command,
    pub result: ExecutionResult,
    /// How many executions happened (1 plus accepted retries).
    pub attempts: usize,
    /// The final result succeeded with nothing on stdout.
    pub no_results: bool,
    pub learned: Option<LearnOutcome>,
}

/// The guided run: resolve, pre-flight, validate, execute, analyze.
///
/// Each recovery path (fix retry, broadened retry) is offered at most once
/// per run. A second failure is final.
pub struct Pipeline<'a> {
    store: &'a SchemaStore,
    config: &'a GuardConfig,
    runner: &'a dyn CommandRunner,
    confirmer: &'a dyn Confirmer,
    console: Console,
    interactive: bool,
}

impl std::fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("store", &self.store.templates_dir())
            .field("interactive", &self.interactive)
            .finish()
    }
}

impl<'a> Pipeline<'a> {
    pub fn new(
        store: &'a SchemaStore,
        config: &'a GuardConfig,
        runner: &'a dyn CommandRunner,
        confirmer: &'a dyn Confirmer,
        console: Console,
        interactive: bool,
    ) -> Self {
        Self {
            store,
            config,
            runner,
            confirmer,
            console,
            interactive,
        }
    }

    /// Like [`Pipeline::run`], but an unresolved variable in an interactive
    /// session offers one chance to fix the env file and try again.
    ///
    /// `reload` re-reads the environment. Lookup stays exact on the retry.
    pub fn run_with_reload<F>(
        &self,
        command: &Command,
        env: &Environment,
        reload: F,
    ) -> Result<RunOutcome, PipelineError>
    where
        F: FnOnce() -> Result<Environment, EnvironmentError>,
    {
        match self.run(command, env) {
            Err(PipelineError::VariableUnresolved(e)) if self.interactive => {
                self.console.error(&e.to_string());
                let retry = self.confirmer.confirm(t!("pipeline.prompt.reload"), false)?;
                if !retry {
                    return Err(e.into());
                }
                let reloaded = reload()?;
                log::info!("Environment reloaded ({} variables).", reloaded.len());
                self.run(command, &reloaded)
            }
            other => other,
        }
    }

    /// Runs `command` through every stage against `env`.
    pub fn run(&self, command: &Command, env: &Environment) -> Result<RunOutcome, PipelineError> {
        let _timer = BlockTimer::new("pipeline");

        self.console.step(t!("pipeline.step.resolve"));
        let resolved = resolve_variables(command, env)?;
        log::debug!("Resolved: {}", redact(&resolved.display_line()));

        self.console.step(t!("pipeline.step.preflight"));
        check_file_paths(&resolved, &self.config.file_path_flags)?;

        self.console.step(t!("pipeline.step.validate"));
        let validation = {
            let _timer = BlockTimer::new("validation");
            Validator::new(self.store, env, self.confirmer, self.interactive, self.console)
                .validate(&resolved)?
        };
        if validation.status == ValidationStatus::NoTemplate {
            self.console.dimmed(t!("pipeline.info.unchecked"));
        }

        self.console.step(t!("pipeline.step.execute"));
        let mut executed = validation.command;
        let mut result = self.execute(&executed);
        let mut attempts = 1;

        if !result.succeeded() {
            if let Some(fixed) = self.offer_fix(&executed, &result, env)? {
                executed = fixed;
                result = self.execute(&executed);
                attempts += 1;
            }
        }

        let mut no_results = self.report_no_results(&result);
        if no_results {
            if let Some(broadened) = self.offer_broadening(&executed)? {
                executed = broadened;
                result = self.execute(&executed);
                attempts += 1;
                no_results = self.report_no_results(&result);
            }
        }

        self.echo_final(&executed);

        if !result.succeeded() {
            return Err(PipelineError::TargetFailed {
                code: result.exit_code,
                command: self.console.scrub(&executed.display_line()),
            });
        }

        let learned = match validation.status {
            ValidationStatus::NoTemplate => self.offer_learning(&executed, env),
            ValidationStatus::Valid { .. } => None,
        };

        Ok(RunOutcome {
            status: validation.status,
            executed,
            result,
            attempts,
            no_results,
            learned,
        })
    }

    fn execute(&self, command: &Command) -> ExecutionResult {
        let result = self.runner.run(command);
        self.console.output(&result.stdout);
        if result.succeeded() {
            self.console.error_output(&result.stderr);
        } else {
            self.console.error(&format!(
                t!("pipeline.error.target_failed"),
                code = result.exit_code,
                details = result.error_text()
            ));
        }
        result
    }

    /// Looks for the single recognized fix. In CI mode it is only shown.
    fn offer_fix(
        &self,
        command: &Command,
        result: &ExecutionResult,
        env: &Environment,
    ) -> Result<Option<Command>, PipelineError> {
        let Some(fix) = analyze_failure(&result.stderr, env) else {
            return Ok(None);
        };
        let Some(value) = env.get(&fix.source_variable) else {
            return Ok(None);
        };

        if !self.interactive {
            self.console.line(&format!(
                t!("pipeline.hint.fix"),
                flag = fix.missing_flag,
                var = fix.source_variable
            ));
            return Ok(None);
        }

        let prompt = format!(
            t!("pipeline.prompt.fix"),
            flag = fix.missing_flag,
            var = fix.source_variable
        );
        if !self.confirmer.confirm(&prompt, false)? {
            return Ok(None);
        }
        log::info!("Retrying with {} from ${}", fix.missing_flag, fix.source_variable);
        self.console.line(t!("pipeline.info.retrying"));
        Ok(Some(command.with_flag(&fix.missing_flag, value)))
    }

    fn report_no_results(&self, result: &ExecutionResult) -> bool {
        let empty = result.is_empty_success();
        if empty {
            self.console.warn(t!("pipeline.warning.no_results"));
        }
        empty
    }

    /// Offers the configured broadening hint for this signature, once.
    fn offer_broadening(&self, command: &Command) -> Result<Option<Command>, PipelineError> {
        let hint = self
            .config
            .broadening_hint_for(&self.store.signature(command));
        let Some(first) = hint.first() else {
            return Ok(None);
        };
        if command.has_flag(first) {
            return Ok(None);
        }

        let extra = hint.join(" ");
        if !self.interactive {
            self.console
                .line(&format!(t!("pipeline.hint.broaden"), extra = extra));
            return Ok(None);
        }
        let prompt = format!(t!("pipeline.prompt.broaden"), extra = extra);
        if !self.confirmer.confirm(&prompt, false)? {
            return Ok(None);
        }
        Ok(Some(command.extended(hint.iter().cloned())))
    }

    /// Echoes the command that produced the final result. This line is
    /// redacted even under `--no-redact`.
    fn echo_final(&self, command: &Command) {
        let line = final_command_line(command);
        log::debug!("{}", line);
        self.console.dimmed(&line);
    }

    /// After a successful unchecked run, offers to derive a template from it.
    /// Learning problems are reported but never fail the run.
    fn offer_learning(&self, command: &Command, env: &Environment) -> Option<LearnOutcome> {
        if !self.interactive {
            return None;
        }
        match self.confirmer.confirm(t!("pipeline.prompt.learn"), false) {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                self.console.warn(&e.to_string());
                return None;
            }
        }
        let learner = Learner::new(
            self.store,
            self.config,
            env,
            self.runner,
            self.confirmer,
            self.console,
        );
        match learner.learn_from_verified(command) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                self.console
                    .warn(&format!(t!("pipeline.warning.learn_failed"), error = e));
                None
            }
        }
    }
}

fn final_command_line(command: &Command) -> String {
    format!(
        t!("pipeline.info.final_command"),
        command = redact(&command.display_line())
    )
}
