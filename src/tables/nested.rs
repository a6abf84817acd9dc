//! Tables scoped to a parent object
//!
//! These tables either need the parent's id in the URL (incident log
//! entries, service integrations) or fan out over every parent when none
//! is given (ruleset rules, schedule users). Parents are walked one at a
//! time; the row budget and the cancellation token are checked before each
//! parent so a satisfied or cancelled query stops fetching.

use super::context::{project, Collection, Projection, QueryContext, RowSink, WithParent};
use super::types::{ColumnDef, KeyColumn, TableDefinition};
use super::Table;
use crate::api::{PagerDutyClient, Resource};
use crate::error::{Error, Result};
use crate::filter::{translate, FilterMapping, FilterTarget, TranslateOptions};
use crate::http::{path_segment, RequestConfig};
use crate::pagination::{ListRequest, ListStats};
use crate::types::{JsonValue, Row};
use async_trait::async_trait;
use tracing::debug;

/// Equality value of a key column the table cannot list without
fn required_qual<'a>(ctx: &'a QueryContext, table: &str, column: &str) -> Result<&'a str> {
    ctx.quals().equals_str(column).ok_or_else(|| {
        Error::table(
            table,
            format!("an equality qualifier on '{column}' is required"),
        )
    })
}

/// Check before moving on to the next parent
fn keep_going(ctx: &QueryContext, sink: &dyn RowSink, stats: &mut ListStats) -> Result<bool> {
    if ctx.cancel().is_cancelled() {
        return Err(Error::Cancelled);
    }
    if sink.rows_remaining().is_exhausted() {
        stats.stopped_early = true;
        return Ok(false);
    }
    Ok(true)
}

// ============================================================================
// Incident log entries
// ============================================================================

const INCIDENT_LOG_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("id", "An unique identifier of the log entry."),
    ColumnDef::string("incident_id", "The ID of the incident the entry belongs to.").computed(),
    ColumnDef::timestamp("created_at", "Time at which the log entry was created."),
    ColumnDef::string("summary", "A short-form, server-generated string describing the object."),
    ColumnDef::string(
        "html_url",
        "A URL at which the entity is uniquely displayed in the web app.",
    ),
    ColumnDef::string("self", "The API show URL at which the object is accessible."),
    ColumnDef::string("type", "The type of log entry."),
    ColumnDef::json("agent", "The agent (user, service or integration) that created the entry."),
    ColumnDef::json("channel", "The channel the entry arrived through."),
    ColumnDef::json("contexts", "Contexts attached to the entry, such as links or images."),
    ColumnDef::json("event_details", "Additional event details."),
    ColumnDef::json("teams", "Teams involved in the entry."),
    ColumnDef::string("title", "Title of the resource.").from_field("id"),
];

const INCIDENT_LOG_FILTERS: &[FilterMapping] =
    &[FilterMapping::new("created_at", FilterTarget::CreatedWindow)];

/// Log entries of one incident
#[derive(Debug, Clone, Copy, Default)]
pub struct IncidentLogTable;

#[async_trait]
impl Table for IncidentLogTable {
    fn name(&self) -> &'static str {
        "pagerduty_incident_log"
    }

    fn definition(&self) -> TableDefinition {
        TableDefinition {
            name: self.name(),
            description: "A log entry records an event on an incident, such as a notification or a status change.",
            columns: INCIDENT_LOG_COLUMNS.to_vec(),
            list_keys: vec![
                KeyColumn::required("incident_id"),
                KeyColumn::range("created_at"),
            ],
            get_keys: Vec::new(),
        }
    }

    async fn list(&self, ctx: &QueryContext, sink: &mut dyn RowSink) -> Result<ListStats> {
        let incident_id = required_qual(ctx, self.name(), "incident_id")?;

        // Log entries have no all-history mode, so the window is passed through as is
        let filters = translate(
            ctx.quals(),
            INCIDENT_LOG_FILTERS,
            &TranslateOptions::unbounded(),
            ctx.now(),
        );
        let entries = Collection::new(
            format!("{}.list", self.name()),
            format!("/incidents/{}/log_entries", path_segment(incident_id)?),
            "log_entries",
        );

        let projection = Projection(INCIDENT_LOG_COLUMNS);
        let mapper = WithParent::new(&projection).with("incident_id", incident_id);
        ctx.list_collection(&mapper, &entries, ListRequest::new().with_filters(filters), sink)
            .await
    }
}

// ============================================================================
// Ruleset rules
// ============================================================================

const RULESET_RULE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("id", "An unique identifier of the event rule."),
    ColumnDef::string("ruleset_id", "The ID of the ruleset the rule belongs to.").computed(),
    ColumnDef::bool("disabled", "Whether the rule is disabled."),
    ColumnDef::int("position", "Position of the rule within the ruleset."),
    ColumnDef::bool("catch_all", "Whether this is the ruleset's catch-all rule."),
    ColumnDef::string("self", "The API show URL at which the object is accessible."),
    ColumnDef::json("actions", "Actions taken when the rule matches."),
    ColumnDef::json("conditions", "Conditions evaluated against the event."),
    ColumnDef::json("time_frame", "When the rule is active."),
    ColumnDef::string("title", "Title of the resource.").from_field("id"),
];

/// Event rules of one ruleset, or of every ruleset
#[derive(Debug, Clone, Copy, Default)]
pub struct RulesetRuleTable;

#[async_trait]
impl Table for RulesetRuleTable {
    fn name(&self) -> &'static str {
        "pagerduty_ruleset_rule"
    }

    fn definition(&self) -> TableDefinition {
        TableDefinition {
            name: self.name(),
            description: "An event rule allows you to set actions that should be taken on events that meet your designated rule criteria.",
            columns: RULESET_RULE_COLUMNS.to_vec(),
            list_keys: vec![KeyColumn::optional("ruleset_id")],
            get_keys: vec!["ruleset_id", "id"],
        }
    }

    async fn list(&self, ctx: &QueryContext, sink: &mut dyn RowSink) -> Result<ListStats> {
        let ruleset_ids: Vec<String> = match ctx.quals().equals_str("ruleset_id") {
            Some(id) => vec![id.to_string()],
            None => {
                let rulesets = Collection::new(
                    format!("{}.list_rulesets", self.name()),
                    "/rulesets",
                    "rulesets",
                );
                ctx.collect_all(&rulesets, ListRequest::new())
                    .await?
                    .iter()
                    .map(|ruleset| ruleset.id().to_string())
                    .collect()
            }
        };

        let projection = Projection(RULESET_RULE_COLUMNS);
        let mut stats = ListStats::default();

        for ruleset_id in &ruleset_ids {
            if !keep_going(ctx, &*sink, &mut stats)? {
                break;
            }

            let rules = Collection::new(
                format!("{}.list", self.name()),
                format!("/rulesets/{}/rules", path_segment(ruleset_id)?),
                "rules",
            );
            let mapper = WithParent::new(&projection).with("ruleset_id", ruleset_id.as_str());
            let nested = ctx
                .list_collection(&mapper, &rules, ListRequest::new(), sink)
                .await?;
            stats.absorb(nested);
        }

        Ok(stats)
    }

    async fn get(&self, ctx: &QueryContext) -> Result<Option<Row>> {
        let quals = ctx.quals();
        let (Some(ruleset_id), Some(id)) = (quals.equals_str("ruleset_id"), quals.equals_str("id"))
        else {
            return Ok(None);
        };

        let operation = format!("{}.get", self.name());
        let client = ctx.client(&operation)?;
        let client: &PagerDutyClient = &client;
        let path = format!(
            "/rulesets/{}/rules/{}",
            path_segment(ruleset_id)?,
            path_segment(id)?
        );
        let path = path.as_str();

        let rule = ctx
            .call_optional(&operation, move || client.get_resource(path, "rule"))
            .await?;

        Ok(rule.map(|rule| {
            let mut row = project(&rule, RULESET_RULE_COLUMNS);
            row.insert("ruleset_id".to_string(), ruleset_id.into());
            row
        }))
    }
}

// ============================================================================
// Schedule users
// ============================================================================

const SCHEDULE_USER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("schedule_id", "The ID of the schedule.").computed(),
    ColumnDef::string("schedule_name", "The name of the schedule.").computed(),
    ColumnDef::string("id", "An unique identifier of the user."),
    ColumnDef::string("name", "The name of the user."),
    ColumnDef::string("email", "The user's email address."),
    ColumnDef::string("role", "The user role."),
    ColumnDef::string("job_title", "The user's title."),
    ColumnDef::string("description", "The user's bio."),
    ColumnDef::string("time_zone", "The preferred time zone name."),
    ColumnDef::string("color", "The schedule color for the user."),
    ColumnDef::string("avatar_url", "The URL of the user's avatar."),
    ColumnDef::string(
        "html_url",
        "A URL at which the entity is uniquely displayed in the web app.",
    ),
    ColumnDef::string("title", "Title of the resource.").from_field("name"),
];

/// Users on one schedule, or on every schedule
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleUserTable;

impl ScheduleUserTable {
    /// The schedules to walk; `None` if the requested schedule does not exist
    async fn schedules(
        &self,
        ctx: &QueryContext,
        client: &PagerDutyClient,
        operation: &str,
    ) -> Result<Option<Vec<Resource>>> {
        match ctx.quals().equals_str("schedule_id") {
            Some(id) => {
                let path = format!("/schedules/{}", path_segment(id)?);
                let path = path.as_str();
                let schedule = ctx
                    .call_optional(operation, move || client.get_resource(path, "schedule"))
                    .await?;
                Ok(schedule.map(|s| vec![s]))
            }
            None => {
                let schedules = Collection::new(operation, "/schedules", "schedules");
                Ok(Some(ctx.collect_all(&schedules, ListRequest::new()).await?))
            }
        }
    }
}

#[async_trait]
impl Table for ScheduleUserTable {
    fn name(&self) -> &'static str {
        "pagerduty_schedule_user"
    }

    fn definition(&self) -> TableDefinition {
        TableDefinition {
            name: self.name(),
            description: "Users that are on call on a schedule.",
            columns: SCHEDULE_USER_COLUMNS.to_vec(),
            list_keys: vec![KeyColumn::optional("schedule_id")],
            get_keys: Vec::new(),
        }
    }

    async fn list(&self, ctx: &QueryContext, sink: &mut dyn RowSink) -> Result<ListStats> {
        let operation = format!("{}.list", self.name());
        let client = ctx.client(&operation)?;
        let client: &PagerDutyClient = &client;

        let mut stats = ListStats::default();
        let Some(schedules) = self.schedules(ctx, client, &operation).await? else {
            return Ok(stats);
        };

        for schedule in &schedules {
            if !keep_going(ctx, &*sink, &mut stats)? {
                break;
            }

            let path = format!("/schedules/{}/users", path_segment(schedule.id())?);
            let path = path.as_str();
            let users = ctx
                .call_optional(&operation, move || {
                    client.get_list::<Resource>(path, "users", RequestConfig::new())
                })
                .await?;
            let Some(users) = users else {
                debug!("{operation}: schedule {} vanished, skipping", schedule.id());
                continue;
            };
            stats.pages_fetched += 1;

            let schedule_name = schedule.field("name").cloned().unwrap_or(JsonValue::Null);
            for user in &users {
                let mut row = project(user, SCHEDULE_USER_COLUMNS);
                row.insert("schedule_id".to_string(), schedule.id().into());
                row.insert("schedule_name".to_string(), schedule_name.clone());

                stats.items_emitted += 1;
                if sink.stream_row(row).is_exhausted() {
                    stats.stopped_early = true;
                    return Ok(stats);
                }
            }
        }

        Ok(stats)
    }
}

// ============================================================================
// Service integrations
// ============================================================================

const SERVICE_INTEGRATION_COLUMNS: &[ColumnDef] = &[
    ColumnDef::string("name", "The name of the integration."),
    ColumnDef::string("id", "An unique identifier of the integration."),
    ColumnDef::string("service_id", "The ID of the service the integration belongs to.").computed(),
    ColumnDef::timestamp("created_at", "The date/time when the integration was created."),
    ColumnDef::string("self", "The API show URL at which the object is accessible."),
    ColumnDef::string(
        "html_url",
        "A URL at which the entity is uniquely displayed in the web app.",
    ),
    ColumnDef::string("integration_key", "The key used to send events to the integration."),
    ColumnDef::string(
        "integration_email",
        "The email address used to send events to the integration.",
    ),
    ColumnDef::string("summary", "A short-form, server-generated string describing the object."),
    ColumnDef::string("type", "The type of integration."),
    ColumnDef::json("service", "Reference to the service."),
    ColumnDef::json("vendor", "Reference to the vendor."),
    ColumnDef::string("title", "Title of the resource.").from_field("name"),
];

/// Integrations of one service
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceIntegrationTable;

#[async_trait]
impl Table for ServiceIntegrationTable {
    fn name(&self) -> &'static str {
        "pagerduty_service_integration"
    }

    fn definition(&self) -> TableDefinition {
        TableDefinition {
            name: self.name(),
            description: "An integration is an endpoint (like Nagios, email or an API call) that generates events for a service.",
            columns: SERVICE_INTEGRATION_COLUMNS.to_vec(),
            list_keys: vec![KeyColumn::required("service_id")],
            get_keys: vec!["service_id", "id"],
        }
    }

    async fn list(&self, ctx: &QueryContext, sink: &mut dyn RowSink) -> Result<ListStats> {
        let service_id = required_qual(ctx, self.name(), "service_id")?;

        let operation = format!("{}.list", self.name());
        let client = ctx.client(&operation)?;
        let client: &PagerDutyClient = &client;
        let path = format!("/services/{}", path_segment(service_id)?);
        let path = path.as_str();

        let service = ctx
            .call_optional(&operation, move || {
                let config = RequestConfig::new().query("include[]", "integrations");
                client.get_item_with::<Resource>(path, "service", config)
            })
            .await?;

        let mut stats = ListStats::default();
        let Some(service) = service else {
            return Ok(stats);
        };
        stats.pages_fetched = 1;

        let integrations: &[JsonValue] = match service.field("integrations") {
            Some(JsonValue::Array(items)) => items,
            _ => &[],
        };

        for integration in integrations {
            if !keep_going(ctx, &*sink, &mut stats)? {
                break;
            }
            let JsonValue::Object(fields) = integration else {
                continue;
            };

            let mut row = project(&Resource::new(fields.clone()), SERVICE_INTEGRATION_COLUMNS);
            row.insert("service_id".to_string(), service_id.into());

            stats.items_emitted += 1;
            if sink.stream_row(row).is_exhausted() {
                stats.stopped_early = true;
                break;
            }
        }

        Ok(stats)
    }

    async fn get(&self, ctx: &QueryContext) -> Result<Option<Row>> {
        let quals = ctx.quals();
        let (Some(service_id), Some(id)) = (quals.equals_str("service_id"), quals.equals_str("id"))
        else {
            return Ok(None);
        };

        let operation = format!("{}.get", self.name());
        let client = ctx.client(&operation)?;
        let client: &PagerDutyClient = &client;
        let path = format!(
            "/services/{}/integrations/{}",
            path_segment(service_id)?,
            path_segment(id)?
        );
        let path = path.as_str();

        let integration = ctx
            .call_optional(&operation, move || client.get_resource(path, "integration"))
            .await?;

        Ok(integration.map(|integration| {
            let mut row = project(&integration, SERVICE_INTEGRATION_COLUMNS);
            row.insert("service_id".to_string(), service_id.into());
            row
        }))
    }
}
