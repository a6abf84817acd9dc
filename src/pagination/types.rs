//! Pagination types
//!
//! Request, response and bookkeeping types for offset pagination.

use crate::error::{Error, Result};
use crate::filter::RequestFilters;

/// Largest page the API serves
pub const MAX_PAGE_SIZE: u32 = 100;

/// One list request: page window plus resource filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Page size
    pub limit: u32,
    /// Offset of the first item
    pub offset: u32,
    /// Resource-specific filters
    pub filters: RequestFilters,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            limit: MAX_PAGE_SIZE,
            offset: 0,
            filters: RequestFilters::default(),
        }
    }
}

impl ListRequest {
    /// First page, maximum page size, no filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set filters
    #[must_use]
    pub fn with_filters(mut self, filters: RequestFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Set the page size, clamped to `1..=MAX_PAGE_SIZE`
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Set the starting offset
    #[must_use]
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Render as query parameters
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("limit".to_string(), self.limit.to_string()),
            ("offset".to_string(), self.offset.to_string()),
            ("total".to_string(), "false".to_string()),
        ];
        params.extend(self.filters.to_query());
        params
    }
}

/// One decoded page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in API order
    pub items: Vec<T>,
    /// More pages are available
    pub more: bool,
    /// Offset the API used
    pub offset: u32,
    /// Limit the API used
    pub limit: u32,
}

impl<T> Page<T> {
    /// A terminal page
    pub fn last(items: Vec<T>) -> Self {
        let limit = items.len() as u32;
        Self {
            items,
            more: false,
            offset: 0,
            limit,
        }
    }

    /// Convert every item
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            more: self.more,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

/// What a NotFound from the page fetch means for a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotFoundPolicy {
    /// The collection is absent; end the listing with no further rows
    #[default]
    EndOfList,
    /// Surface the error to the caller
    Propagate,
}

/// Outcome of a completed listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListStats {
    /// Pages successfully fetched
    pub pages_fetched: u32,
    /// Items handed to the emitter
    pub items_emitted: u64,
    /// The row budget ran out before the API did
    pub stopped_early: bool,
}

impl ListStats {
    /// Fold in the stats of a nested listing
    pub fn absorb(&mut self, other: ListStats) {
        self.pages_fetched = self.pages_fetched.saturating_add(other.pages_fetched);
        self.items_emitted = self.items_emitted.saturating_add(other.items_emitted);
        self.stopped_early |= other.stopped_early;
    }
}

/// Tracks the next request during iteration
#[derive(Debug, Clone)]
pub(crate) struct PaginationState {
    pub(crate) request: ListRequest,
    pub(crate) stats: ListStats,
}

impl PaginationState {
    pub(crate) fn new(request: ListRequest) -> Self {
        Self {
            request,
            stats: ListStats::default(),
        }
    }

    /// Move the window past a consumed page; `page_limit` is the limit the API reported
    pub(crate) fn advance(&mut self, page_limit: u32) -> Result<()> {
        let step = if page_limit > 0 {
            page_limit
        } else {
            self.request.limit
        };

        let next = self
            .request
            .offset
            .checked_add(step)
            .filter(|next| *next > self.request.offset)
            .ok_or_else(|| {
                Error::pagination(format!(
                    "offset {} cannot advance by {step}",
                    self.request.offset
                ))
            })?;

        self.request.offset = next;
        Ok(())
    }

    pub(crate) fn finish(&self) -> ListStats {
        self.stats
    }

    pub(crate) fn stop_early(&mut self) -> ListStats {
        self.stats.stopped_early = true;
        self.stats
    }
}
