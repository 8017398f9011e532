// src/cli/handlers/commons.rs

// Shared setup for the handlers: argument parsing, configuration, the
// template store and the environment snapshot.

use anyhow::{Context, Result};
use clap::{Parser, error::ErrorKind};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::{
    core::{
        config_loader,
        console::Console,
        environment::Environment,
        paths,
        pipeline::PipelineError,
        prompt::{Confirmer, NonInteractive, TerminalConfirmer},
        redactor::Redactor,
        schema_store::SchemaStore,
        validator::ValidationError,
    },
    models::GuardConfig,
};

/// Everything a pipeline-facing handler needs, loaded once per invocation.
#[derive(Debug)]
pub struct Session {
    pub config: GuardConfig,
    pub store: SchemaStore,
    pub env_file: PathBuf,
    pub env: Environment,
}

/// Parses a handler's own arguments. `--help` and `--version` print and exit
/// like any clap program instead of surfacing as an error.
pub fn parse_args<T: Parser>(args: &[String]) -> Result<T> {
    match T::try_parse_from(args) {
        Ok(parsed) => Ok(parsed),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => Err(e.into()),
    }
}

/// Loads the configuration, opens the template store and reads the
/// environment. Store and environment problems are pipeline failures.
pub fn open_session() -> Result<Session> {
    let config = config_loader::load_config().context(t!("error.config_load"))?;
    let store = open_store(&config)?;
    let env_file = paths::get_env_file_path(&config)?;
    let env = Environment::load(Some(env_file.as_path())).map_err(PipelineError::from)?;
    log::debug!(
        "Session ready: {} variables, templates in {}",
        env.len(),
        store.templates_dir().display()
    );
    Ok(Session {
        config,
        store,
        env_file,
        env,
    })
}

/// Opens the configured templates directory. A malformed common schema
/// document is reported as a malformed template.
pub fn open_store(config: &GuardConfig) -> Result<SchemaStore> {
    let templates_dir = paths::get_templates_dir(config)?;
    let store = SchemaStore::open(&templates_dir, config.signature_length)
        .map_err(|e| PipelineError::from(ValidationError::from(e)))?;
    Ok(store)
}

pub fn console(redact: bool) -> Console {
    Console::new(Redactor::new(redact))
}

/// Prompts need a terminal on stdin; anything else is treated as
/// non-interactive.
pub fn stdin_is_interactive() -> bool {
    std::io::stdin().is_terminal()
}

pub fn confirmer(interactive: bool) -> Box<dyn Confirmer> {
    if interactive {
        Box::new(TerminalConfirmer)
    } else {
        Box::new(NonInteractive)
    }
}
