// src/bin/ociguard.rs

use clap::Parser;
use colored::*;
use ociguard::{
    cli::{Cli, dispatcher},
    core::{learner::LearnError, pipeline::PipelineError, redactor::redact},
};

/// The main entry point of the `ociguard` application.
/// It sets up logging, parses arguments, dispatches to the correct handler,
/// and maps every error to a redacted message and an exit code.
fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = dispatcher::dispatch(cli.args) {
        // --- Centralized Error Handling ---
        let (stage, code) = if let Some(err) = e.downcast_ref::<PipelineError>() {
            (Some(err.stage()), err.exit_code())
        } else if let Some(err) = e.downcast_ref::<LearnError>() {
            (Some("learn"), err.exit_code())
        } else {
            (None, 1)
        };

        let message = format!("{:#}", e);
        match stage {
            Some(stage) => eprintln!("\n{}: {}: {}", "Error".red().bold(), stage, redact(&message)),
            None => eprintln!("\n{}: {}", "Error".red().bold(), redact(&message)),
        }
        std::process::exit(code);
    }
}
