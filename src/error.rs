//! Error types for the PagerDuty table connector
//!
//! This module defines the error hierarchy for the entire crate, plus the
//! classifier that decides whether a failure is retried, suppressed as
//! "not found", or surfaced to the host.

use thiserror::Error;

/// The main error type for the connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Missing credential: {message}")]
    MissingCredential { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Upstream API Errors
    // ============================================================================
    #[error("PagerDuty API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<i64>,
        errors: Vec<String>,
        retry_after_seconds: Option<u64>,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{operation} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        source: Box<Error>,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Pagination error: {message}")]
    Pagination { message: String },

    // ============================================================================
    // Table Errors
    // ============================================================================
    #[error("Table '{table}': {message}")]
    Table { table: String, message: String },

    #[error("{operation} ({phase}): {source}")]
    Query {
        operation: String,
        phase: Phase,
        source: Box<Error>,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Where in an operation a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Building or fetching the session client
    Connection,
    /// Talking to the API
    Query,
    /// Fetching an auxiliary column for a listed item
    Hydrate,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Connection => "connection_error",
            Phase::Query => "query_error",
            Phase::Hydrate => "hydrate_error",
        };
        f.write_str(s)
    }
}

/// How a failure should be handled by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Upstream throttling; retry with backoff
    Retryable,
    /// Upstream reports the entity or collection absent
    NotFound,
    /// Everything else; abort the operation
    Fatal,
}

/// Coarse error taxonomy surfaced to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingCredential,
    RateLimited,
    NotFound,
    TransportOrProtocol,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a missing credential error
    pub fn missing_credential(message: impl Into<String>) -> Self {
        Self::MissingCredential {
            message: message.into(),
        }
    }

    /// Create a structured API error with only a status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            code: None,
            errors: Vec::new(),
            retry_after_seconds: None,
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a pagination error
    pub fn pagination(message: impl Into<String>) -> Self {
        Self::Pagination {
            message: message.into(),
        }
    }

    /// Create a table error
    pub fn table(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Table {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Wrap an error with the operation and phase it came from
    pub fn in_operation(self, operation: impl Into<String>, phase: Phase) -> Self {
        Self::Query {
            operation: operation.into(),
            phase,
            source: Box::new(self),
        }
    }

    /// Classify this error for retry and suppression decisions
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Api { status: 429, .. } => ErrorClass::Retryable,
            Error::Api { status: 404, .. } => ErrorClass::NotFound,
            Error::Query { source, .. } => source.class(),
            _ => ErrorClass::Fatal,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Retryable
    }

    /// Check if this error means the upstream entity is absent
    pub fn is_not_found(&self) -> bool {
        self.class() == ErrorClass::NotFound
    }

    /// Map onto the host-facing taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingCredential { .. } => ErrorKind::MissingCredential,
            Error::Query { source, .. } => source.kind(),
            Error::RetriesExhausted { source, .. } if source.is_retryable() => {
                ErrorKind::RateLimited
            }
            _ => match self.class() {
                ErrorClass::Retryable => ErrorKind::RateLimited,
                ErrorClass::NotFound => ErrorKind::NotFound,
                ErrorClass::Fatal => ErrorKind::TransportOrProtocol,
            },
        }
    }

    /// Seconds the upstream asked us to wait before retrying, if any
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Error::Api {
                retry_after_seconds,
                ..
            } => *retry_after_seconds,
            Error::Query { source, .. } => source.retry_after(),
            _ => None,
        }
    }
}

/// Classify an error; usable wherever a classifier function is expected
pub fn classify(error: &Error) -> ErrorClass {
    error.class()
}

/// Result type alias for the connector
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
