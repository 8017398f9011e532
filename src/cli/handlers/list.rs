use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::{cli::handlers::commons, core::config_loader};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Lists the saved validation templates.")]
struct ListArgs {
    /// Also show each template's file path.
    #[arg(long, short)]
    paths: bool,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let list_args: ListArgs = commons::parse_args(&args)?;
    let config = config_loader::load_config()?;
    let store = commons::open_store(&config)?;

    let entries = store.list_templates()?;
    if entries.is_empty() {
        println!("{}", t!("list.info.empty"));
        println!(
            "{}",
            format!(
                t!("list.info.location"),
                path = store.templates_dir().display()
            )
            .dimmed()
        );
        return Ok(());
    }

    println!("{}", t!("list.header").bold());
    for entry in &entries {
        match &entry.template {
            Ok(template) => {
                let rules = template.required_args.len() + template.arg_schemas.len();
                println!(
                    "  {} {} {}",
                    entry.name.cyan(),
                    template.command,
                    format!(t!("list.item.rules"), count = rules).dimmed()
                );
            }
            Err(reason) => {
                println!(
                    "  {} {}",
                    entry.name.red(),
                    format!(t!("list.item.malformed"), reason = reason).red()
                );
            }
        }
        if list_args.paths {
            println!("      {}", entry.path.display().to_string().dimmed());
        }
    }
    Ok(())
}
