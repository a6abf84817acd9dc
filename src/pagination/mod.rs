//! Pagination module
//!
//! Offset pagination over PagerDuty list endpoints (`limit`, `offset`,
//! `more`).
//!
//! # Overview
//!
//! A table supplies a "fetch one page" closure; [`Paginator::list_all`]
//! drives it from offset zero, retries rate-limited pages, and hands items
//! to an [`Emitter`] until the API reports no more pages or the caller's
//! row budget reaches zero.

mod emitter;
mod engine;
mod types;

pub use emitter::{Collector, Emitter};
pub use engine::Paginator;
pub use types::{ListRequest, ListStats, NotFoundPolicy, Page, MAX_PAGE_SIZE};
