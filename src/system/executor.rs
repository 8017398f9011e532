// src/system/executor.rs

use crate::{
    constants::{EXIT_LAUNCH_FAILURE, EXIT_SIGNALLED},
    core::redactor::redact,
    dev_utils::BlockTimer,
    models::{Command, ExecutionResult},
};
#[cfg(test)]
use std::{cell::RefCell, collections::VecDeque};
use std::process::{Command as StdCommand, Stdio};

/// Runs a fully resolved command and reports what happened.
///
/// Implementations never fail: a process that cannot even be started is
/// reported as an [`ExecutionResult`] with a synthetic non-zero code.
pub trait CommandRunner {
    fn run(&self, command: &Command) -> ExecutionResult;
}

/// Spawns the target CLI as a real subprocess.
///
/// The pager variable is overridden for the child only, so output capture is
/// complete and never blocks on an interactive pager. Stdin stays attached to
/// the terminal for the target CLI's own confirmation prompts.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    pager_env_var: String,
    pager_value: String,
}

impl SystemRunner {
    pub fn new(pager_env_var: impl Into<String>, pager_value: impl Into<String>) -> Self {
        Self {
            pager_env_var: pager_env_var.into(),
            pager_value: pager_value.into(),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &Command) -> ExecutionResult {
        let Some(program) = command.program() else {
            return launch_failure("No command specified to run.");
        };
        log::debug!("Spawning: {}", redact(&command.display_line()));
        let _timer = BlockTimer::new("target CLI");

        let output = StdCommand::new(program)
            .args(command.args())
            .env(&self.pager_env_var, &self.pager_value)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        match output {
            Ok(output) => {
                let exit_code = output.status.code().unwrap_or(EXIT_SIGNALLED);
                log::debug!("Target CLI exited with code {}", exit_code);
                ExecutionResult {
                    exit_code,
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }
            }
            Err(e) => {
                log::debug!("Could not launch '{}': {}", program, e);
                launch_failure(&format!("Command '{}' could not be executed: {}", program, e))
            }
        }
    }
}

fn launch_failure(message: &str) -> ExecutionResult {
    ExecutionResult {
        exit_code: EXIT_LAUNCH_FAILURE,
        stdout: String::new(),
        stderr: message.to_string(),
    }
}

/// Replays canned results in order and records every command it was given.
/// Once the script runs out, every further run succeeds with empty output.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    results: RefCell<VecDeque<ExecutionResult>>,
    calls: RefCell<Vec<Command>>,
}

#[cfg(test)]
impl ScriptedRunner {
    pub fn new(results: Vec<ExecutionResult>) -> Self {
        Self {
            results: RefCell::new(results.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Every command passed to `run`, in order.
    pub fn calls(&self) -> Vec<Command> {
        self.calls.borrow().clone()
    }
}

#[cfg(test)]
impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &Command) -> ExecutionResult {
        self.calls.borrow_mut().push(command.clone());
        self.results
            .borrow_mut()
            .pop_front()
            .unwrap_or(ExecutionResult {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
            })
    }
}
