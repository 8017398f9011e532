// src/core/mod.rs

pub mod arg_parser;
pub mod config_loader;
pub mod console;
pub mod environment;
pub mod failure_analyzer;
pub mod json_source;
pub mod learner;
pub mod paths;
pub mod pipeline;
pub mod preflight;
pub mod prompt;
pub mod redactor;
pub mod resolver;
pub mod schema_infer;
pub mod schema_store;
pub mod validator;
