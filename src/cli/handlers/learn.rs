use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::{
    cli::handlers::commons,
    core::{
        learner::{LearnOutcome, Learner},
        prompt::PromptError,
    },
    models::Command,
    system::executor::SystemRunner,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Runs a command and interactively builds a validation template from it."
)]
struct LearnArgs {
    /// Print OCIDs and IP addresses as-is. Logs stay redacted.
    #[arg(long)]
    no_redact: bool,

    /// The command to learn from, given after `--`.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    command: Vec<String>,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let learn_args: LearnArgs = commons::parse_args(&args)?;
    if !commons::stdin_is_interactive() {
        return Err(PromptError::NotInteractive(t!("learn.error.needs_terminal").to_string()).into());
    }

    let session = commons::open_session()?;
    let console = commons::console(!learn_args.no_redact);
    let confirmer = commons::confirmer(true);
    let runner = SystemRunner::new(
        session.config.pager_env_var.as_str(),
        session.config.pager_value.as_str(),
    );

    let learner = Learner::new(
        &session.store,
        &session.config,
        &session.env,
        &runner,
        confirmer.as_ref(),
        console,
    );
    match learner.learn(&Command::new(learn_args.command))? {
        LearnOutcome::Saved { path, template } => {
            println!(
                "\n{} {}",
                t!("common.success"),
                format!(t!("learn.success.saved"), command = template.command.cyan())
            );
            println!("  {}", path.display().to_string().dimmed());
        }
        LearnOutcome::NothingToSave => {
            println!("\n{}", t!("learn.info.nothing_to_save").yellow());
        }
        LearnOutcome::KeptExisting { path } => {
            println!(
                "\n{}",
                format!(t!("learn.info.kept_existing"), path = path.display())
            );
        }
    }
    Ok(())
}
