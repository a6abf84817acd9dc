//! CLI module
//!
//! Command-line interface over the PagerDuty tables.
//!
//! # Commands
//!
//! - `check` - Test the credential against the API
//! - `tables` - Show table definitions
//! - `list` - Stream rows of a table, with qualifiers and a row limit
//! - `get` - Fetch one row by key

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
