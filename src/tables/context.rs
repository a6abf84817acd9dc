//! Per-operation context and row plumbing
//!
//! A [`QueryContext`] is what one list or get call sees: the connection
//! session, the host's qualifiers and requested columns, the retry policy
//! and the cancellation token. Rows leave through a [`RowSink`], which also
//! tells the table how many more rows the host wants.

use super::types::{ColumnDef, ColumnSource, HydrationPolicy};
use crate::api::{PagerDutyClient, Resource};
use crate::error::{classify, Error, Phase, Result};
use crate::filter::Qualifiers;
use crate::pagination::{Collector, Emitter, ListRequest, ListStats, NotFoundPolicy, Paginator};
use crate::retry::{with_retry, RetryPolicy};
use crate::session::ConnectionSession;
use crate::types::{JsonObject, JsonValue, Row, RowBudget};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

// ============================================================================
// Row Sinks
// ============================================================================

/// Host-side receiver of rows
pub trait RowSink: Send {
    /// Accept a row; returns how many more the host wants
    fn stream_row(&mut self, row: Row) -> RowBudget;

    /// How many more rows the host wants
    fn rows_remaining(&self) -> RowBudget;
}

/// Sink that keeps rows in memory
#[derive(Debug, Default)]
pub struct CollectSink {
    rows: Vec<Row>,
    budget: RowBudget,
}

impl CollectSink {
    /// Collect every row
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect at most `limit` rows when a limit is given
    pub fn with_limit(limit: Option<u64>) -> Self {
        Self {
            rows: Vec::new(),
            budget: RowBudget::from_limit(limit),
        }
    }

    /// Rows received so far
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Take the rows
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl RowSink for CollectSink {
    fn stream_row(&mut self, row: Row) -> RowBudget {
        self.rows.push(row);
        self.budget = self.budget.decrement();
        self.budget
    }

    fn rows_remaining(&self) -> RowBudget {
        self.budget
    }
}

// ============================================================================
// Row Mapping
// ============================================================================

/// Turns one listed object into a row, fetching hydrated columns as needed
#[async_trait]
pub trait RowMapper: Send + Sync {
    async fn to_row(&self, ctx: &QueryContext, item: Resource) -> Result<Row>;
}

/// Copy every field-sourced column out of an object; absent fields become null
pub fn project(item: &Resource, columns: &[ColumnDef]) -> Row {
    let mut row = Row::new();
    for column in columns {
        if let ColumnSource::Field(path) = column.source {
            let value = item.field(path).cloned().unwrap_or(JsonValue::Null);
            row.insert(column.name.to_string(), value);
        }
    }
    row
}

/// Mapper that only projects fields
#[derive(Debug, Clone, Copy)]
pub struct Projection(pub &'static [ColumnDef]);

#[async_trait]
impl RowMapper for Projection {
    async fn to_row(&self, _ctx: &QueryContext, item: Resource) -> Result<Row> {
        Ok(project(&item, self.0))
    }
}

/// Wraps a mapper and adds fixed columns, such as the parent's id
pub struct WithParent<'a, M: ?Sized> {
    inner: &'a M,
    extra: JsonObject,
}

impl<'a, M: RowMapper + ?Sized> WithParent<'a, M> {
    pub fn new(inner: &'a M) -> Self {
        Self {
            inner,
            extra: JsonObject::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(column.to_string(), value.into());
        self
    }
}

#[async_trait]
impl<'a, M: RowMapper + ?Sized> RowMapper for WithParent<'a, M> {
    async fn to_row(&self, ctx: &QueryContext, item: Resource) -> Result<Row> {
        let mut row = self.inner.to_row(ctx, item).await?;
        for (column, value) in &self.extra {
            row.insert(column.clone(), value.clone());
        }
        Ok(row)
    }
}

/// Adapts a mapper and a sink into a paginator emitter
struct RowEmitter<'a, M: ?Sized> {
    ctx: &'a QueryContext,
    mapper: &'a M,
    sink: &'a mut dyn RowSink,
}

#[async_trait]
impl<'a, M: RowMapper + ?Sized> Emitter<Resource> for RowEmitter<'a, M> {
    async fn emit(&mut self, item: Resource) -> Result<RowBudget> {
        let row = self.mapper.to_row(self.ctx, item).await?;
        Ok(self.sink.stream_row(row))
    }

    fn remaining(&self) -> RowBudget {
        self.sink.rows_remaining()
    }
}

// ============================================================================
// Collections
// ============================================================================

/// An offset-paginated endpoint
#[derive(Debug, Clone)]
pub struct Collection {
    pub operation: String,
    pub path: String,
    pub key: &'static str,
    pub not_found: NotFoundPolicy,
}

impl Collection {
    /// A collection whose absence means "no rows"
    pub fn new(operation: impl Into<String>, path: impl Into<String>, key: &'static str) -> Self {
        Self {
            operation: operation.into(),
            path: path.into(),
            key,
            not_found: NotFoundPolicy::EndOfList,
        }
    }

    /// Surface NotFound to the caller instead
    #[must_use]
    pub fn propagate_not_found(mut self) -> Self {
        self.not_found = NotFoundPolicy::Propagate;
        self
    }
}

// ============================================================================
// Query Context
// ============================================================================

/// Everything one table operation needs
#[derive(Debug, Clone)]
pub struct QueryContext {
    session: Arc<ConnectionSession>,
    quals: Qualifiers,
    columns: Vec<String>,
    retry: RetryPolicy,
    cancel: CancellationToken,
    now: DateTime<Utc>,
}

impl QueryContext {
    /// Context with no qualifiers, all columns, and the session's retry policy
    pub fn new(session: Arc<ConnectionSession>) -> Self {
        let retry = session.retry_policy();
        Self {
            session,
            quals: Qualifiers::new(),
            columns: Vec::new(),
            retry,
            cancel: CancellationToken::new(),
            now: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_quals(mut self, quals: Qualifiers) -> Self {
        self.quals = quals;
        self
    }

    /// Restrict to the given columns; empty means all
    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Pin "now" for time-window translation
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn session(&self) -> &ConnectionSession {
        &self.session
    }

    pub fn quals(&self) -> &Qualifiers {
        &self.quals
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// True if the host asked for this column
    pub fn wants(&self, column: &str) -> bool {
        self.columns.is_empty() || self.columns.iter().any(|c| c == column)
    }

    /// The session's client; failures are tagged as connection errors
    pub fn client(&self, operation: &str) -> Result<Arc<PagerDutyClient>> {
        self.session
            .client()
            .map_err(|e| e.in_operation(operation, Phase::Connection))
    }

    /// Run one API call under the retry policy
    pub async fn call<T, F, Fut>(&self, operation: &str, op: F) -> Result<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
        T: Send,
    {
        with_retry(operation, op, &self.retry, classify, &self.cancel).await
    }

    /// Like [`call`](Self::call), but NotFound yields `None`
    pub async fn call_optional<T, F, Fut>(&self, operation: &str, op: F) -> Result<Option<T>>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
        T: Send,
    {
        match self.call(operation, op).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() => {
                debug!("{operation}: not found");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Await a hydration fetch and apply the column's NotFound policy
    pub async fn hydrate<T>(
        &self,
        operation: &str,
        policy: HydrationPolicy,
        fetch: impl Future<Output = Result<T>> + Send,
    ) -> Result<Option<T>> {
        match fetch.await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() && policy == HydrationPolicy::NullOnNotFound => {
                debug!("{operation}: sub-resource not found, leaving column null");
                Ok(None)
            }
            Err(err @ (Error::Query { .. } | Error::Cancelled)) => Err(err),
            Err(err) => Err(err.in_operation(operation, Phase::Hydrate)),
        }
    }

    /// Stream every object of a collection through `mapper` into `sink`
    pub async fn list_collection<M: RowMapper + ?Sized>(
        &self,
        mapper: &M,
        collection: &Collection,
        request: ListRequest,
        sink: &mut dyn RowSink,
    ) -> Result<ListStats> {
        let client = self.client(&collection.operation)?;
        let paginator = Paginator::new(collection.operation.clone(), self.retry.clone())
            .with_not_found(collection.not_found);
        let path = collection.path.clone();
        let key = collection.key;

        let mut emitter = RowEmitter {
            ctx: self,
            mapper,
            sink,
        };

        paginator
            .list_all(
                move |req: ListRequest| {
                    let client = client.clone();
                    let path = path.clone();
                    async move { client.list_page::<Resource>(&path, key, &req).await }
                },
                request,
                &mut emitter,
                &self.cancel,
            )
            .await
    }

    /// Fetch every object of a collection into memory
    pub async fn collect_all(
        &self,
        collection: &Collection,
        request: ListRequest,
    ) -> Result<Vec<Resource>> {
        let client = self.client(&collection.operation)?;
        let paginator = Paginator::new(collection.operation.clone(), self.retry.clone())
            .with_not_found(collection.not_found);
        let path = collection.path.clone();
        let key = collection.key;

        let mut collector = Collector::new();
        paginator
            .list_all(
                move |req: ListRequest| {
                    let client = client.clone();
                    let path = path.clone();
                    async move { client.list_page::<Resource>(&path, key, &req).await }
                },
                request,
                &mut collector,
                &self.cancel,
            )
            .await?;

        Ok(collector.into_items())
    }
}
