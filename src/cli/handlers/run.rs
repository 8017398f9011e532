use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::{
    cli::handlers::commons,
    core::{environment::Environment, pipeline::Pipeline},
    models::Command,
    system::executor::SystemRunner,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Validates, runs and analyzes an OCI CLI command.",
    after_help = "Example: ociguard run -- oci compute instance list --compartment-id $COMPARTMENT_ID"
)]
struct RunArgs {
    /// Non-interactive mode: never prompt, fail immediately with a distinct exit code.
    #[arg(long)]
    ci: bool,

    /// Print OCIDs and IP addresses as-is. Logs stay redacted.
    #[arg(long)]
    no_redact: bool,

    /// The command to wrap, given after `--`.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    command: Vec<String>,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    // 1. Parse this handler's arguments.
    let run_args: RunArgs = commons::parse_args(&args)?;
    let interactive = !run_args.ci && commons::stdin_is_interactive();
    if !run_args.ci && !interactive {
        log::info!("stdin is not a terminal; running without prompts.");
    }

    // 2. Load configuration, templates and environment.
    let session = commons::open_session()?;
    let console = commons::console(!run_args.no_redact);
    let confirmer = commons::confirmer(interactive);
    let runner = SystemRunner::new(
        session.config.pager_env_var.as_str(),
        session.config.pager_value.as_str(),
    );

    // 3. Run the pipeline. Errors carry their own exit code up to `main`.
    let pipeline = Pipeline::new(
        &session.store,
        &session.config,
        &runner,
        confirmer.as_ref(),
        console,
        interactive,
    );
    let command = Command::new(run_args.command);
    let env_file = session.env_file.clone();
    let outcome = pipeline.run_with_reload(&command, &session.env, || {
        Environment::load(Some(env_file.as_path()))
    })?;

    // 4. Final feedback.
    if outcome.no_results {
        println!("\n{}", t!("run.info.no_results").yellow());
    } else {
        println!("\n{} {}", t!("common.success"), t!("run.success.done"));
    }
    if outcome.attempts > 1 {
        println!(
            "{}",
            format!(t!("run.info.attempts"), count = outcome.attempts).dimmed()
        );
    }
    Ok(())
}
