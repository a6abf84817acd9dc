//! Predicate-to-request translation
//!
//! Host qualifiers (`column <op> value`) are pushed down into the API's
//! native filter parameters where PagerDuty supports them. Anything that
//! cannot be pushed down is simply dropped; the host re-applies every
//! predicate to the returned rows, so over-fetching is safe.
//!
//! # Overview
//!
//! - [`Qualifiers`] collects predicates per column
//! - [`FilterMapping`] declares, per table, which column feeds which API filter
//! - [`translate`] produces [`RequestFilters`], including the `created_at`
//!   window and the all-history fallback for windows PagerDuty refuses

mod translate;
mod types;

pub use translate::{translate, INCIDENT_LOOKBACK_DAYS};
pub use types::{
    DateRange, FilterMapping, FilterTarget, Operator, QualValue, Qualifier, Qualifiers,
    RequestFilters, TranslateOptions,
};
