// src/core/arg_parser.rs

use crate::models::Command;

/// One `--flag [value]` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagArg<'a> {
    pub name: &'a str,
    /// `Some("val")` for `--key val`, `None` for a boolean `--key`.
    pub value: Option<&'a str>,
}

/// The flag -> value view of a command, in first-seen order.
///
/// # Logic:
/// - Any token starting with `--` is a flag.
/// - If the next token does *not* start with `--`, it is the flag's value.
/// - Otherwise (or at the end of the command) the flag is boolean.
/// - Positional tokens are ignored; a repeated flag keeps its first position
///   and its last value.
#[derive(Debug, Clone, Default)]
pub struct ParsedArgs<'a> {
    flags: Vec<FlagArg<'a>>,
}

impl<'a> ParsedArgs<'a> {
    pub fn new(command: &'a Command) -> Self {
        let mut flags: Vec<FlagArg<'a>> = Vec::new();
        let mut tokens = command.tokens().iter().map(String::as_str).peekable();

        while let Some(token) = tokens.next() {
            if !token.starts_with("--") {
                continue;
            }
            let value = match tokens.peek() {
                Some(next) if !next.starts_with("--") => tokens.next(),
                _ => None,
            };

            if let Some(existing) = flags.iter_mut().find(|f| f.name == token) {
                existing.value = value;
            } else {
                flags.push(FlagArg { name: token, value });
            }
        }

        Self { flags }
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f.name == flag)
    }

    /// `None` if the flag is absent, `Some(None)` if it is boolean.
    pub fn get(&self, flag: &str) -> Option<Option<&'a str>> {
        self.flags.iter().find(|f| f.name == flag).map(|f| f.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlagArg<'a>> {
        self.flags.iter()
    }
}

/// Normalizes a flag into an environment-variable search key:
/// `--compartment-id` -> `COMPARTMENT_ID`.
pub fn env_search_key(flag: &str) -> String {
    flag.trim_start_matches('-')
        .trim_end_matches('-')
        .replace('-', "_")
        .to_uppercase()
}
