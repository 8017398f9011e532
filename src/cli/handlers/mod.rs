// src/cli/handlers/mod.rs

// One module per CLI action.

pub mod commons;
pub mod delete;
pub mod learn;
pub mod list;
pub mod run;
pub mod show;
