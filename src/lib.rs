// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # PagerDuty Tables
//!
//! A read-only connector that exposes PagerDuty REST resources as tables.
//!
//! ## Features
//!
//! - **Sixteen tables**: incidents, services, users, schedules, rulesets and more
//! - **Qualifier pushdown**: equality and range predicates become API filters
//! - **Offset pagination**: pages stream straight into the host's row sink
//! - **Hydrated columns**: tags, members, dependencies and custom fields on demand
//! - **Rate limiting and retry**: client-side quota plus backoff on HTTP 429
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagerduty_tables::connector::Connector;
//! use pagerduty_tables::config::ConnectionConfig;
//! use pagerduty_tables::filter::Qualifiers;
//! use pagerduty_tables::tables::CollectSink;
//!
//! #[tokio::main]
//! async fn main() -> pagerduty_tables::Result<()> {
//!     let connector = Connector::new(ConnectionConfig::new().with_token("u+..."));
//!
//!     let ctx = connector
//!         .context()
//!         .with_quals(Qualifiers::new().with_eq("status", "triggered"));
//!     let mut sink = CollectSink::with_limit(Some(50));
//!     connector.list("pagerduty_incident", &ctx, &mut sink).await?;
//!
//!     for row in sink.rows() {
//!         println!("{}", row["title"]);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Connector                                │
//! │  tables() → definitions   list() → RowSink   get() → Row        │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │ Session  │   API     │   Paginate    │  Filter   │   Tables    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Token    │ REST v2   │ Offset/limit  │ Qualifiers│ Catalog     │
//! │ Lazy     │ Retry     │ Row budget    │ Date range│ Nested      │
//! │ client   │ Rate Limit│ Not-found end │ Lookback  │ Hydration   │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types and classification
pub mod error;

/// Common types and type aliases
pub mod types;

/// Connection configuration
pub mod config;

/// Credential resolution
pub mod auth;

/// HTTP client with rate limiting
pub mod http;

/// Retry with backoff
pub mod retry;

/// Offset pagination
pub mod pagination;

/// Qualifier to API filter translation
pub mod filter;

/// PagerDuty REST client
pub mod api;

/// Connection sessions
pub mod session;

/// Table definitions and row production
pub mod tables;

/// Connector entry point
pub mod connector;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::ConnectionConfig;
pub use connector::{CheckResult, Connector};
pub use tables::{Table, TableDefinition};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
