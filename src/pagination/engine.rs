//! Offset pagination driver
//!
//! [`Paginator::list_all`] walks an offset-paginated collection one page at
//! a time, retrying rate-limited page fetches, and streams every item to an
//! [`Emitter`]. Pages are fetched strictly in order; the row budget is
//! checked after each page and after each emitted item so no page is
//! requested once the caller has enough.

use super::emitter::Emitter;
use super::types::{ListRequest, ListStats, NotFoundPolicy, Page, PaginationState, MAX_PAGE_SIZE};
use crate::error::{classify, Error, Result};
use crate::retry::{with_retry, RetryPolicy};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Drives one listing operation
#[derive(Debug, Clone)]
pub struct Paginator {
    operation: String,
    retry: RetryPolicy,
    not_found: NotFoundPolicy,
}

impl Paginator {
    /// Create a paginator for a named operation
    pub fn new(operation: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            operation: operation.into(),
            retry,
            not_found: NotFoundPolicy::default(),
        }
    }

    /// Choose how a NotFound page fetch is treated
    #[must_use]
    pub fn with_not_found(mut self, policy: NotFoundPolicy) -> Self {
        self.not_found = policy;
        self
    }

    /// Operation name used in logs and errors
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Fetch every page and emit every item until the API or the budget runs out
    pub async fn list_all<T, F, Fut, E>(
        &self,
        mut fetch_page: F,
        request: ListRequest,
        emitter: &mut E,
        cancel: &CancellationToken,
    ) -> Result<ListStats>
    where
        T: Send,
        F: FnMut(ListRequest) -> Fut,
        Fut: Future<Output = Result<Page<T>>>,
        E: Emitter<T> + ?Sized,
    {
        let mut state = PaginationState::new(request);

        loop {
            let budget = emitter.remaining();
            if budget.is_exhausted() {
                debug!("{}: row budget exhausted, not fetching more", self.operation);
                return Ok(state.stop_early());
            }
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            state.request.limit =
                budget.clamp_page_size(state.request.limit.clamp(1, MAX_PAGE_SIZE));

            let page_request = state.request.clone();
            let fetched = with_retry(
                &self.operation,
                || fetch_page(page_request.clone()),
                &self.retry,
                classify,
                cancel,
            )
            .await;

            let page = match fetched {
                Ok(page) => page,
                Err(err) if err.is_not_found() && self.not_found == NotFoundPolicy::EndOfList => {
                    debug!("{}: collection not found, ending listing", self.operation);
                    return Ok(state.finish());
                }
                Err(err) => return Err(err),
            };

            state.stats.pages_fetched += 1;
            debug!(
                operation = %self.operation,
                offset = state.request.offset,
                limit = state.request.limit,
                items = page.items.len(),
                more = page.more,
                "fetched page"
            );

            let more = page.more;
            let page_limit = page.limit;

            for item in page.items {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let remaining = emitter.emit(item).await?;
                state.stats.items_emitted += 1;
                if remaining.is_exhausted() {
                    return Ok(state.stop_early());
                }
            }

            if !more {
                return Ok(state.finish());
            }

            state.advance(page_limit)?;
        }
    }
}
