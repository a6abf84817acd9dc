//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Query PagerDuty resources as tables
#[derive(Parser, Debug)]
#[command(name = "pagerduty-tables")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Connection configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API token; overrides the configuration file and the environment
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// API base URL; overrides the configuration file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test the credential against the API
    Check,

    /// List table definitions
    Tables {
        /// Show a single table
        #[arg(long)]
        table: Option<String>,
    },

    /// Stream rows of a table
    List {
        /// Table name, e.g. pagerduty_incident
        table: String,

        /// Qualifier such as `status=resolved` or `created_at>=2024-01-01T00:00:00Z` (repeatable)
        #[arg(short = 'w', long = "where")]
        quals: Vec<String>,

        /// Columns to return (comma-separated, empty = all)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Maximum rows to return
        #[arg(short, long)]
        limit: Option<u64>,
    },

    /// Fetch one row by key
    Get {
        /// Table name
        table: String,

        /// Key qualifier such as `id=PABC123` (repeatable)
        #[arg(short, long = "key")]
        keys: Vec<String>,

        /// Columns to return (comma-separated, empty = all)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
