//! PagerDuty resources as tables
//!
//! Every table implements [`Table`]: a definition for the host, a `list`
//! that streams rows into a [`RowSink`], and an optional `get` by key.
//!
//! # Overview
//!
//! - [`ResourceTable`] covers plain collections from a static description
//!   (see [`catalog`])
//! - [`nested`] holds the tables scoped to a parent object
//! - [`QueryContext`] carries the session, qualifiers, requested columns,
//!   retry policy and cancellation token into every call
//! - [`builtin_tables`] is the registry the [`crate::connector::Connector`] serves

pub mod catalog;
mod context;
pub mod nested;
mod resource;
mod types;

pub use context::{
    project, CollectSink, Collection, Projection, QueryContext, RowMapper, RowSink, WithParent,
};
pub use resource::{Hydration, Hydrator, ResourceTable};
pub use types::{
    ColumnDef, ColumnSource, ColumnType, HydrationPolicy, KeyColumn, Requirement, TableDefinition,
};

use crate::error::{Error, Result};
use crate::pagination::ListStats;
use crate::types::Row;
use async_trait::async_trait;
use std::sync::Arc;

/// One queryable relation
#[async_trait]
pub trait Table: Send + Sync {
    /// Table name as the host sees it
    fn name(&self) -> &'static str;

    /// Columns and key columns
    fn definition(&self) -> TableDefinition;

    /// Stream every matching row into `sink` until the API or the sink's budget runs out
    async fn list(&self, ctx: &QueryContext, sink: &mut dyn RowSink) -> Result<ListStats>;

    /// Fetch the single row identified by the context's key qualifiers
    ///
    /// Returns `Ok(None)` when a key is missing or the object does not exist.
    async fn get(&self, ctx: &QueryContext) -> Result<Option<Row>> {
        let _ = ctx;
        Err(Error::table(self.name(), "single-row lookup is not supported"))
    }
}

/// Every built-in table, in name order
pub fn builtin_tables() -> Vec<Arc<dyn Table>> {
    let tables: [Arc<dyn Table>; 16] = [
        Arc::new(catalog::BUSINESS_SERVICE),
        Arc::new(catalog::ESCALATION_POLICY),
        Arc::new(catalog::INCIDENT),
        Arc::new(nested::IncidentLogTable),
        Arc::new(catalog::ON_CALL),
        Arc::new(catalog::PRIORITY),
        Arc::new(catalog::RULESET),
        Arc::new(nested::RulesetRuleTable),
        Arc::new(catalog::SCHEDULE),
        Arc::new(nested::ScheduleUserTable),
        Arc::new(catalog::SERVICE),
        Arc::new(nested::ServiceIntegrationTable),
        Arc::new(catalog::TAG),
        Arc::new(catalog::TEAM),
        Arc::new(catalog::USER),
        Arc::new(catalog::VENDOR),
    ];
    tables.into()
}

/// Look up a built-in table by name
pub fn builtin_table(name: &str) -> Option<Arc<dyn Table>> {
    builtin_tables().into_iter().find(|t| t.name() == name)
}

#[cfg(test)]
mod tests;
