//! # System Interaction Layer
//!
//! The boundary between the pipeline and the operating system.
//!
//! ## Modules
//!
//! - **`executor`**: spawns the target CLI with its pager disabled, captures
//!   stdout/stderr and the exit code, and reports launch failures as results
//!   instead of errors. Also provides a scripted runner for tests.

pub mod executor;
