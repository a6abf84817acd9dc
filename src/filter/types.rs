//! Qualifier and request-filter types

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use regex::Regex;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

// ============================================================================
// Operators and Values
// ============================================================================

/// Comparison operator on a qualifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl Operator {
    /// SQL spelling of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "=" => Ok(Self::Eq),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            other => Err(Error::Other(format!("unsupported operator '{other}'"))),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value side of a qualifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualValue {
    String(String),
    Timestamp(DateTime<Utc>),
    List(Vec<String>),
}

impl QualValue {
    /// Borrow as a single string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret as a timestamp; strings are parsed as RFC 3339 or a bare date
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            Self::String(s) => parse_timestamp(s),
            Self::List(_) => None,
        }
    }

    /// All string values (one for a scalar, many for a list)
    pub fn strings(&self) -> Vec<String> {
        match self {
            Self::String(s) => vec![s.clone()],
            Self::List(values) => values.clone(),
            Self::Timestamp(t) => vec![format_timestamp(*t)],
        }
    }
}

impl From<&str> for QualValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for QualValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<DateTime<Utc>> for QualValue {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Timestamp(t)
    }
}

impl From<Vec<String>> for QualValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// RFC 3339 with second precision, as the API expects
pub(crate) fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ============================================================================
// Qualifiers
// ============================================================================

/// One host-supplied predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualifier {
    pub operator: Operator,
    pub value: QualValue,
}

impl Qualifier {
    /// Create a qualifier
    pub fn new(operator: Operator, value: impl Into<QualValue>) -> Self {
        Self {
            operator,
            value: value.into(),
        }
    }
}

/// Regex for `column<op>value` expressions
static EXPR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(>=|<=|=|>|<)\s*(.*?)\s*$").unwrap()
});

/// Predicates grouped by column name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Qualifiers {
    by_field: BTreeMap<String, Vec<Qualifier>>,
}

impl Qualifiers {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate
    pub fn add(&mut self, field: impl Into<String>, qualifier: Qualifier) {
        self.by_field.entry(field.into()).or_default().push(qualifier);
    }

    /// Builder form of [`Qualifiers::add`]
    #[must_use]
    pub fn with(
        mut self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<QualValue>,
    ) -> Self {
        self.add(field, Qualifier::new(operator, value));
        self
    }

    /// Builder form for an equality predicate
    #[must_use]
    pub fn with_eq(self, field: impl Into<String>, value: impl Into<QualValue>) -> Self {
        self.with(field, Operator::Eq, value)
    }

    /// All predicates on a column
    pub fn get(&self, field: &str) -> &[Qualifier] {
        self.by_field.get(field).map_or(&[], Vec::as_slice)
    }

    /// First equality value on a column
    pub fn equals(&self, field: &str) -> Option<&QualValue> {
        self.get(field)
            .iter()
            .find(|q| q.operator == Operator::Eq)
            .map(|q| &q.value)
    }

    /// First equality value on a column, as a non-empty string
    pub fn equals_str(&self, field: &str) -> Option<&str> {
        self.equals(field)
            .and_then(QualValue::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Columns that carry at least one predicate
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.by_field.keys().map(String::as_str)
    }

    /// True if no predicates were given
    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    /// Parse `column<op>value` text, e.g. `created_at>=2024-01-01T00:00:00Z`
    pub fn parse_expr(expr: &str) -> Result<(String, Qualifier)> {
        let caps = EXPR_RE
            .captures(expr)
            .ok_or_else(|| Error::Other(format!("invalid qualifier '{expr}'")))?;

        let field = caps[1].to_string();
        let operator: Operator = caps[2].parse()?;
        let value = caps[3].trim_matches(|c| c == '\'' || c == '"').to_string();

        Ok((field, Qualifier::new(operator, value)))
    }

    /// Parse many expressions into one set
    pub fn parse_all<'a>(exprs: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut quals = Self::new();
        for expr in exprs {
            let (field, qual) = Self::parse_expr(expr)?;
            quals.add(field, qual);
        }
        Ok(quals)
    }
}

// ============================================================================
// Filter Mapping
// ============================================================================

/// API filter a column is pushed down into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget {
    /// Free-text `query` parameter
    Query,
    /// `statuses[]`
    Statuses,
    /// `urgencies[]`
    Urgencies,
    /// `incident_key`
    IncidentKey,
    /// An arbitrary (possibly repeated) parameter name
    Param(&'static str),
    /// `since`/`until` window derived from range predicates
    CreatedWindow,
}

/// Column → filter declaration for one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterMapping {
    pub column: &'static str,
    pub target: FilterTarget,
}

impl FilterMapping {
    /// Create a mapping
    pub const fn new(column: &'static str, target: FilterTarget) -> Self {
        Self { column, target }
    }
}

/// Translation knobs
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Oldest `since` the endpoint accepts; older windows switch to all-history
    pub lookback_limit: Option<chrono::Duration>,
}

impl TranslateOptions {
    /// No lookback restriction
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Restrict windows to the given number of days
    pub fn with_lookback_days(days: i64) -> Self {
        Self {
            lookback_limit: Some(chrono::Duration::days(days)),
        }
    }
}

// ============================================================================
// Request Filters
// ============================================================================

/// Special `date_range` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    /// Ignore since/until and search the whole history
    All,
}

/// Filters for one list request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilters {
    pub query: Option<String>,
    pub statuses: Vec<String>,
    pub urgencies: Vec<String>,
    pub incident_key: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub date_range: Option<DateRange>,
    pub params: Vec<(String, String)>,
}

impl RequestFilters {
    /// Render as query parameters
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(query) = &self.query {
            params.push(("query".to_string(), query.clone()));
        }
        for status in &self.statuses {
            params.push(("statuses[]".to_string(), status.clone()));
        }
        for urgency in &self.urgencies {
            params.push(("urgencies[]".to_string(), urgency.clone()));
        }
        if let Some(key) = &self.incident_key {
            params.push(("incident_key".to_string(), key.clone()));
        }

        match self.date_range {
            Some(DateRange::All) => {
                params.push(("date_range".to_string(), "all".to_string()));
            }
            None => {
                if let Some(since) = self.since {
                    params.push(("since".to_string(), format_timestamp(since)));
                }
                if let Some(until) = self.until {
                    params.push(("until".to_string(), format_timestamp(until)));
                }
            }
        }

        params.extend(self.params.iter().cloned());
        params
    }
}
