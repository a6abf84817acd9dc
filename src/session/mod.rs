//! Connection sessions
//!
//! A [`ConnectionSession`] owns everything one logical connection needs and
//! builds its [`PagerDutyClient`](crate::api::PagerDutyClient) lazily, at
//! most once, on first use.

mod provider;

pub use provider::{ClientFactory, ConnectionSession, DefaultClientFactory};
