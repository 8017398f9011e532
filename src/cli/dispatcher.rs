use anyhow::{Result, anyhow};
use clap::CommandFactory;

use crate::cli::{Cli, handlers};

/// A system command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>) -> Result<()>,
}

/// The single source of truth for all commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "run",
        aliases: &[],
        handler: handlers::run::handle,
    },
    CommandDefinition {
        name: "learn",
        aliases: &[],
        handler: handlers::learn::handle,
    },
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "show",
        aliases: &[],
        handler: handlers::show::handle,
    },
    CommandDefinition {
        name: "delete",
        aliases: &["del", "rm"],
        handler: handlers::delete::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Routes `ociguard <action> [args...]` to the matching handler.
pub fn dispatch(all_args: Vec<String>) -> Result<()> {
    log::debug!("Dispatching args: {:?}", all_args);

    let Some((action, rest)) = all_args.split_first() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match find_command(action) {
        Some(command) => (command.handler)(rest.to_vec()),
        None => Err(anyhow!(t!("error.unknown_command"), name = action)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve_to_their_command() {
        assert_eq!(find_command("ls").map(|c| c.name), Some("list"));
        assert_eq!(find_command("rm").map(|c| c.name), Some("delete"));
        assert_eq!(find_command("del").map(|c| c.name), Some("delete"));
        assert!(find_command("oci").is_none());
    }

    #[test]
    fn test_unknown_action_is_an_error() {
        let err = dispatch(vec!["frobnicate".to_string()]).unwrap_err();
        assert!(err.to_string().contains("frobnicate"));
    }
}
