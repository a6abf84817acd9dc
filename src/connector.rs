//! Connector entry point
//!
//! A [`Connector`] owns one connection's session and the table registry.
//! Hosts resolve tables by name through it, and every list or get failure
//! is logged and tagged with the operation it came from before it leaves
//! the crate.

use crate::api::Resource;
use crate::config::ConnectionConfig;
use crate::error::{Error, Phase, Result};
use crate::pagination::{ListRequest, ListStats};
use crate::session::ConnectionSession;
use crate::tables::{builtin_tables, QueryContext, RowSink, Table, TableDefinition};
use crate::types::Row;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Connector
// ============================================================================

/// One PagerDuty connection and the tables it serves
pub struct Connector {
    session: Arc<ConnectionSession>,
    tables: Vec<Arc<dyn Table>>,
}

impl Connector {
    /// Connector over the built-in tables
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_session(Arc::new(ConnectionSession::new(config)))
    }

    /// Connector over an existing session
    pub fn with_session(session: Arc<ConnectionSession>) -> Self {
        Self {
            session,
            tables: builtin_tables(),
        }
    }

    /// Register a table, replacing any table of the same name
    #[must_use]
    pub fn with_table(mut self, table: Arc<dyn Table>) -> Self {
        self.tables.retain(|t| t.name() != table.name());
        self.tables.push(table);
        self
    }

    pub fn session(&self) -> &Arc<ConnectionSession> {
        &self.session
    }

    /// Fresh context for one operation
    pub fn context(&self) -> QueryContext {
        QueryContext::new(self.session.clone())
    }

    /// Definitions of every registered table
    pub fn tables(&self) -> Vec<TableDefinition> {
        self.tables.iter().map(|t| t.definition()).collect()
    }

    /// Resolve a table by name
    pub fn table(&self, name: &str) -> Result<Arc<dyn Table>> {
        self.tables
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| Error::table(name, "no such table"))
    }

    /// Stream a table's rows into `sink`
    pub async fn list(
        &self,
        table: &str,
        ctx: &QueryContext,
        sink: &mut dyn RowSink,
    ) -> Result<ListStats> {
        let operation = format!("{table}.list");
        let resolved = self.table(table)?;

        debug!(table, quals = ?ctx.quals(), "listing");
        match resolved.list(ctx, sink).await {
            Ok(stats) => {
                info!(
                    table,
                    pages = stats.pages_fetched,
                    rows = stats.items_emitted,
                    stopped_early = stats.stopped_early,
                    "list complete"
                );
                Ok(stats)
            }
            Err(err) => Err(surface(&operation, err)),
        }
    }

    /// Fetch a single row by key; `None` when it does not exist
    pub async fn get(&self, table: &str, ctx: &QueryContext) -> Result<Option<Row>> {
        let operation = format!("{table}.get");
        let resolved = self.table(table)?;

        match resolved.get(ctx).await {
            Ok(row) => {
                debug!(table, found = row.is_some(), "get complete");
                Ok(row)
            }
            Err(err) => Err(surface(&operation, err)),
        }
    }

    /// Test the credential with the cheapest authenticated call there is
    pub async fn check(&self, ctx: &QueryContext) -> CheckResult {
        let operation = "check";
        let attempt = async {
            let client = ctx.client(operation)?;
            let client = client.as_ref();
            let request = ListRequest::new().with_limit(1);
            let request = &request;
            ctx.call(operation, move || {
                client.list_page::<Resource>("/users", "users", request)
            })
            .await
        };

        match attempt.await {
            Ok(_) => CheckResult::success(),
            Err(err) => {
                error!(operation, error = %err, "connection check failed");
                CheckResult::failure(err.to_string())
            }
        }
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("session", &self.session)
            .field("tables", &self.tables.len())
            .finish()
    }
}

/// Log a failure and tag it with the operation, unless a phase is already known
fn surface(operation: &str, err: Error) -> Error {
    let err = match err {
        err @ (Error::Query { .. } | Error::Cancelled) => err,
        other => other.in_operation(operation, Phase::Query),
    };
    match &err {
        Error::Cancelled => info!(operation, "cancelled"),
        _ => error!(operation, kind = ?err.kind(), error = %err, "operation failed"),
    }
    err
}
