use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{cli::handlers::commons, core::config_loader};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Deletes a saved validation template.")]
struct DeleteArgs {
    /// Template file stem (`oci_compute_instance_list`) or quoted signature.
    #[arg(required = true, num_args = 1..)]
    name: Vec<String>,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    // 1. Parse arguments and find the file.
    let delete_args: DeleteArgs = commons::parse_args(&args)?;
    let config = config_loader::load_config()?;
    let store = commons::open_store(&config)?;
    let path = store.locate(&delete_args.name.join(" "))?;

    // 2. Confirm. Declining is the default, and without a terminal nothing
    //    can be confirmed at all.
    println!(
        "\n{}",
        format!(t!("delete.warning.header"), path = path.display())
            .red()
            .bold()
    );
    let confirmer = commons::confirmer(commons::stdin_is_interactive());
    if !confirmer.confirm(t!("delete.prompt.are_you_sure"), false)? {
        println!("\n{}", t!("common.info.operation_cancelled"));
        return Ok(());
    }

    // 3. Delete.
    store.delete_template(&path)?;
    log::info!("Deleted template {}", path.display());
    println!(
        "\n{} {}",
        t!("common.success"),
        format!(t!("delete.success.done"), path = path.display())
    );
    Ok(())
}
