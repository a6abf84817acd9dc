//! Generic resource table
//!
//! Most PagerDuty collections look alike: `GET /things` pages through
//! `{"things": [...]}`, `GET /things/{id}` returns `{"thing": {...}}`, and a
//! few columns need a secondary request per row. [`ResourceTable`] covers
//! all of them from a static description.

use super::context::{project, Collection, QueryContext, RowMapper, RowSink};
use super::types::{ColumnDef, ColumnSource, HydrationPolicy, KeyColumn, TableDefinition};
use super::Table;
use crate::api::{PagerDutyClient, Resource};
use crate::error::{Error, Result};
use crate::filter::{translate, FilterMapping, FilterTarget, TranslateOptions};
use crate::http::path_segment;
use crate::pagination::{ListRequest, ListStats};
use crate::types::{JsonValue, Row};
use async_trait::async_trait;
use serde::Serialize;

/// Secondary request behind a hydrated column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydrator {
    /// `/{entity}/{id}/tags`
    Tags(&'static str),
    /// `/teams/{id}/members`
    TeamMembers,
    /// `/service_dependencies/technical_services/{id}`
    TechnicalDependencies,
    /// `/service_dependencies/business_services/{id}`
    BusinessDependencies,
    /// `/incidents/{id}/custom_fields/values`
    CustomFields,
    /// `/incidents/{id}/business_services/impacts`
    BusinessServiceImpacts,
    /// A field of the full object, fetched once per row from the item endpoint
    Detail(&'static str),
}

/// One hydrated column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hydration {
    pub column: &'static str,
    pub hydrator: Hydrator,
}

impl Hydration {
    pub const fn new(column: &'static str, hydrator: Hydrator) -> Self {
        Self { column, hydrator }
    }
}

/// Table over one list endpoint and, optionally, its item endpoint
#[derive(Debug, Clone, Copy)]
pub struct ResourceTable {
    name: &'static str,
    description: &'static str,
    columns: &'static [ColumnDef],
    path: &'static str,
    list_key: &'static str,
    item_key: Option<&'static str>,
    filters: &'static [FilterMapping],
    lookback_days: Option<i64>,
    hydrations: &'static [Hydration],
}

impl ResourceTable {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        columns: &'static [ColumnDef],
        path: &'static str,
        list_key: &'static str,
    ) -> Self {
        Self {
            name,
            description,
            columns,
            path,
            list_key,
            item_key: None,
            filters: &[],
            lookback_days: None,
            hydrations: &[],
        }
    }

    /// Enable lookup by `id` through `{path}/{id}`
    pub const fn with_item_key(self, key: &'static str) -> Self {
        Self {
            item_key: Some(key),
            ..self
        }
    }

    pub const fn with_filters(self, filters: &'static [FilterMapping]) -> Self {
        Self { filters, ..self }
    }

    /// Fall back to all-history mode for windows older than `days`
    pub const fn with_lookback_days(self, days: i64) -> Self {
        Self {
            lookback_days: Some(days),
            ..self
        }
    }

    pub const fn with_hydrations(self, hydrations: &'static [Hydration]) -> Self {
        Self { hydrations, ..self }
    }

    fn translate_options(&self) -> TranslateOptions {
        self.lookback_days
            .map_or_else(TranslateOptions::unbounded, TranslateOptions::with_lookback_days)
    }

    fn list_keys(&self) -> Vec<KeyColumn> {
        let mut keys: Vec<KeyColumn> = Vec::new();
        for mapping in self.filters {
            if keys.iter().any(|k| k.name == mapping.column) {
                continue;
            }
            keys.push(match mapping.target {
                FilterTarget::CreatedWindow => KeyColumn::range(mapping.column),
                _ => KeyColumn::optional(mapping.column),
            });
        }
        keys
    }

    fn policy_for(&self, column: &str) -> HydrationPolicy {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .and_then(|c| match c.source {
                ColumnSource::Hydrated(policy) => Some(policy),
                _ => None,
            })
            .unwrap_or(HydrationPolicy::FailRow)
    }

    /// Full object for `Detail` columns; the listed item is reused when it already has them
    async fn detail(
        &self,
        ctx: &QueryContext,
        client: &PagerDutyClient,
        item: &Resource,
    ) -> Result<Option<Resource>> {
        let complete = self.hydrations.iter().all(|h| match h.hydrator {
            Hydrator::Detail(field) => item.field(field).is_some(),
            _ => true,
        });
        if complete {
            return Ok(Some(item.clone()));
        }

        let Some(key) = self.item_key else {
            return Ok(None);
        };

        let operation = format!("{}.detail", self.name);
        let path = format!("{}/{}", self.path, path_segment(item.id())?);
        let path = path.as_str();
        let policy = self
            .hydrations
            .iter()
            .find(|h| matches!(h.hydrator, Hydrator::Detail(_)))
            .map_or(HydrationPolicy::FailRow, |h| self.policy_for(h.column));

        ctx.hydrate(
            &operation,
            policy,
            ctx.call(&operation, move || client.get_resource(path, key)),
        )
        .await
    }

    async fn hydrate_value(
        &self,
        ctx: &QueryContext,
        client: &PagerDutyClient,
        id: &str,
        hydration: &Hydration,
    ) -> Result<Option<JsonValue>> {
        let operation = format!("{}.{}", self.name, hydration.column);
        let op = operation.as_str();
        let policy = self.policy_for(hydration.column);

        match hydration.hydrator {
            Hydrator::Tags(entity) => {
                let path = format!("/{entity}/{}/tags", path_segment(id)?);
                let tags = Collection::new(op, path, "tags").propagate_not_found();
                let fetched = ctx.collect_all(&tags, ListRequest::new());
                to_json(ctx.hydrate(op, policy, fetched).await?)
            }
            Hydrator::TeamMembers => {
                let path = format!("/teams/{}/members", path_segment(id)?);
                let members = Collection::new(op, path, "members").propagate_not_found();
                let fetched = ctx.collect_all(&members, ListRequest::new());
                to_json(ctx.hydrate(op, policy, fetched).await?)
            }
            Hydrator::TechnicalDependencies => {
                let fetched = ctx.call(op, move || client.technical_service_dependencies(id));
                to_json(ctx.hydrate(op, policy, fetched).await?)
            }
            Hydrator::BusinessDependencies => {
                let fetched = ctx.call(op, move || client.business_service_dependencies(id));
                to_json(ctx.hydrate(op, policy, fetched).await?)
            }
            Hydrator::CustomFields => {
                let fetched = ctx.call(op, move || client.incident_custom_fields(id));
                to_json(ctx.hydrate(op, policy, fetched).await?)
            }
            Hydrator::BusinessServiceImpacts => {
                let fetched = ctx.call(op, move || client.incident_business_service_impacts(id));
                to_json(ctx.hydrate(op, policy, fetched).await?)
            }
            Hydrator::Detail(_) => Ok(None),
        }
    }
}

fn to_json<T: Serialize>(value: Option<T>) -> Result<Option<JsonValue>> {
    value
        .map(|v| serde_json::to_value(v).map_err(Error::from))
        .transpose()
}

#[async_trait]
impl RowMapper for ResourceTable {
    async fn to_row(&self, ctx: &QueryContext, item: Resource) -> Result<Row> {
        let mut row = project(&item, self.columns);

        let wanted: Vec<&Hydration> = self
            .hydrations
            .iter()
            .filter(|h| ctx.wants(h.column))
            .collect();
        if wanted.is_empty() {
            return Ok(row);
        }

        let client = ctx.client(&format!("{}.hydrate", self.name))?;
        let mut detail: Option<Option<Resource>> = None;

        for hydration in wanted {
            let value = match hydration.hydrator {
                Hydrator::Detail(field) => {
                    if detail.is_none() {
                        detail = Some(self.detail(ctx, &client, &item).await?);
                    }
                    detail
                        .as_ref()
                        .and_then(Option::as_ref)
                        .and_then(|full| full.field(field).cloned())
                }
                _ => self.hydrate_value(ctx, &client, item.id(), hydration).await?,
            };
            row.insert(
                hydration.column.to_string(),
                value.unwrap_or(JsonValue::Null),
            );
        }

        Ok(row)
    }
}

#[async_trait]
impl Table for ResourceTable {
    fn name(&self) -> &'static str {
        self.name
    }

    fn definition(&self) -> TableDefinition {
        TableDefinition {
            name: self.name,
            description: self.description,
            columns: self.columns.to_vec(),
            list_keys: self.list_keys(),
            get_keys: if self.item_key.is_some() {
                vec!["id"]
            } else {
                Vec::new()
            },
        }
    }

    async fn list(&self, ctx: &QueryContext, sink: &mut dyn RowSink) -> Result<ListStats> {
        let filters = translate(ctx.quals(), self.filters, &self.translate_options(), ctx.now());
        let request = ListRequest::new().with_filters(filters);
        let collection = Collection::new(format!("{}.list", self.name), self.path, self.list_key);
        ctx.list_collection(self, &collection, request, sink).await
    }

    async fn get(&self, ctx: &QueryContext) -> Result<Option<Row>> {
        let Some(key) = self.item_key else {
            return Err(Error::table(self.name, "single-row lookup is not supported"));
        };
        let Some(id) = ctx.quals().equals_str("id") else {
            return Ok(None);
        };

        let operation = format!("{}.get", self.name);
        let client = ctx.client(&operation)?;
        let client: &PagerDutyClient = &client;
        let path = format!("{}/{}", self.path, path_segment(id)?);
        let path = path.as_str();

        match ctx
            .call_optional(&operation, move || client.get_resource(path, key))
            .await?
        {
            Some(item) => Ok(Some(self.to_row(ctx, item).await?)),
            None => Ok(None),
        }
    }
}
