//! PagerDuty API surface
//!
//! [`PagerDutyClient`] is the one handle a connection shares between
//! operations. It knows the list/get envelopes PagerDuty uses and the four
//! hand-built endpoints that return typed values.

mod client;
mod extended;
mod models;

pub use client::PagerDutyClient;
pub use models::{
    BusinessServiceImpact, CustomFieldValue, ObjectReference, Relationship, Resource,
};
