//! Common types used throughout the connector
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// One table row, keyed by column name
pub type Row = JsonObject;

// ============================================================================
// Row Budget
// ============================================================================

/// How many more rows the host still wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowBudget {
    /// No limit was given
    #[default]
    Unbounded,
    /// At most this many rows remain
    Remaining(u64),
}

impl RowBudget {
    /// Budget for an optional host limit
    pub fn from_limit(limit: Option<u64>) -> Self {
        limit.map_or(Self::Unbounded, Self::Remaining)
    }

    /// True once the host needs no more rows
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Remaining(0))
    }

    /// Clamp a page size to this budget
    pub fn clamp_page_size(&self, max: u32) -> u32 {
        match self {
            Self::Unbounded => max,
            Self::Remaining(n) => u32::try_from(*n).map_or(max, |n| n.min(max)),
        }
    }

    /// Budget after one more row has been emitted
    #[must_use]
    pub fn decrement(self) -> Self {
        match self {
            Self::Unbounded => Self::Unbounded,
            Self::Remaining(n) => Self::Remaining(n.saturating_sub(1)),
        }
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
