//! Qualifier translation
//!
//! Equality predicates on mapped columns become API filter parameters.
//! Range predicates on a creation-time column are folded into one
//! `since`/`until` window, with one second of slop so the API's inclusive
//! bounds match the host's exclusive operators.

use super::types::{
    DateRange, FilterMapping, FilterTarget, Operator, Qualifier, Qualifiers, RequestFilters,
    TranslateOptions,
};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Oldest window the incidents endpoint accepts before `date_range=all` is required
pub const INCIDENT_LOOKBACK_DAYS: i64 = 180;

/// Build request filters for one table from host qualifiers
pub fn translate(
    quals: &Qualifiers,
    mapping: &[FilterMapping],
    options: &TranslateOptions,
    now: DateTime<Utc>,
) -> RequestFilters {
    let mut filters = RequestFilters::default();

    for entry in mapping {
        let predicates = quals.get(entry.column);
        if predicates.is_empty() {
            continue;
        }

        match entry.target {
            FilterTarget::Query => {
                if let Some(value) = quals.equals_str(entry.column) {
                    filters.query = Some(value.to_string());
                }
            }
            FilterTarget::IncidentKey => {
                if let Some(value) = quals.equals_str(entry.column) {
                    filters.incident_key = Some(value.to_string());
                }
            }
            FilterTarget::Statuses => filters.statuses.extend(equality_values(predicates)),
            FilterTarget::Urgencies => filters.urgencies.extend(equality_values(predicates)),
            FilterTarget::Param(name) => {
                for value in equality_values(predicates) {
                    filters.params.push((name.to_string(), value));
                }
            }
            FilterTarget::CreatedWindow => {
                let (since, until) = resolve_window(predicates);
                filters.since = tighter(filters.since, since, std::cmp::max);
                filters.until = tighter(filters.until, until, std::cmp::min);
            }
        }
    }

    if let (Some(limit), Some(since)) = (options.lookback_limit, filters.since) {
        if since < now - limit {
            debug!(
                "window starting {since} is older than the lookback limit, searching all history"
            );
            filters.since = None;
            filters.until = None;
            filters.date_range = Some(DateRange::All);
        }
    }

    filters
}

/// Non-empty string values of the equality predicates
fn equality_values(predicates: &[Qualifier]) -> Vec<String> {
    predicates
        .iter()
        .filter(|q| q.operator == Operator::Eq)
        .flat_map(|q| q.value.strings())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Fold every range predicate on one column into the tightest window
fn resolve_window(predicates: &[Qualifier]) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let second = Duration::seconds(1);
    let mut since = None;
    let mut until = None;

    for qual in predicates {
        let Some(at) = qual.value.as_timestamp() else {
            continue;
        };

        let (lower, upper) = match qual.operator {
            Operator::Gt => (Some(at + second), None),
            Operator::Ge => (Some(at), None),
            Operator::Eq => (Some(at - second), Some(at + second)),
            Operator::Le => (None, Some(at + second)),
            Operator::Lt => (None, Some(at)),
        };

        since = tighter(since, lower, std::cmp::max);
        until = tighter(until, upper, std::cmp::min);
    }

    (since, until)
}

fn tighter<T: Copy>(current: Option<T>, next: Option<T>, pick: fn(T, T) -> T) -> Option<T> {
    match (current, next) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}
