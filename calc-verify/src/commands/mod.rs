//! Subcommand implementations.
//!
//! Each `execute` returns `Ok(true)` when every checked case passed.

pub mod check;
pub mod config;
pub mod helpers;
pub mod run;
