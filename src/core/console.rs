// src/core/console.rs

use crate::core::redactor::Redactor;
use colored::Colorize;

/// Where the pipeline writes user-facing text. Everything passes through the
/// redactor first; `quiet` silences the console entirely (tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    redactor: Redactor,
    quiet: bool,
}

impl Console {
    pub fn new(redactor: Redactor) -> Self {
        Self {
            redactor,
            quiet: false,
        }
    }

    pub fn quiet() -> Self {
        Self {
            redactor: Redactor::default(),
            quiet: true,
        }
    }

    /// Redacted copy of `text` for embedding in prompts and errors.
    pub fn scrub(&self, text: &str) -> String {
        self.redactor.apply(text).into_owned()
    }

    pub fn line(&self, text: &str) {
        if !self.quiet {
            println!("{}", self.redactor.apply(text));
        }
    }

    pub fn step(&self, text: &str) {
        if !self.quiet {
            println!("{}", self.scrub(text).bold());
        }
    }

    pub fn success(&self, text: &str) {
        if !self.quiet {
            println!("{}", self.scrub(text).green());
        }
    }

    pub fn warn(&self, text: &str) {
        if !self.quiet {
            println!("{} {}", "Warning:".yellow().bold(), self.redactor.apply(text));
        }
    }

    pub fn error(&self, text: &str) {
        if !self.quiet {
            eprintln!("{} {}", "Error:".red().bold(), self.redactor.apply(text));
        }
    }

    pub fn dimmed(&self, text: &str) {
        if !self.quiet {
            println!("{}", self.scrub(text).dimmed());
        }
    }

    /// Raw captured output of the target CLI, printed as-is after redaction.
    pub fn output(&self, text: &str) {
        if !self.quiet && !text.is_empty() {
            print!("{}", self.redactor.apply(text));
            if !text.ends_with('\n') {
                println!();
            }
        }
    }

    pub fn error_output(&self, text: &str) {
        if !self.quiet && !text.is_empty() {
            eprint!("{}", self.redactor.apply(text));
            if !text.ends_with('\n') {
                eprintln!();
            }
        }
    }
}
