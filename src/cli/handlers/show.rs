use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs;

use crate::{
    cli::handlers::commons,
    core::{config_loader, schema_store::load_template},
};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Prints a saved validation template.")]
struct ShowArgs {
    /// Template file stem (`oci_compute_instance_list`) or quoted signature.
    #[arg(required = true, num_args = 1..)]
    name: Vec<String>,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let show_args: ShowArgs = commons::parse_args(&args)?;
    let config = config_loader::load_config()?;
    let store = commons::open_store(&config)?;

    // `show oci compute instance list` and `show "oci compute instance list"`
    // name the same template.
    let name = show_args.name.join(" ");
    let path = store.locate(&name)?;
    let content = fs::read_to_string(&path)
        .with_context(|| format!(t!("show.error.read"), path = path.display()))?;

    println!("{}", path.display().to_string().dimmed());
    println!("{}", content.trim_end());

    if let Err(e) = load_template(&path) {
        println!("\n{} {}", t!("show.warning.malformed").yellow().bold(), e);
    }
    Ok(())
}
