//! Tests for the resource tables

use super::*;
use crate::config::ConnectionConfig;
use crate::error::{Error, Phase};
use crate::filter::{Operator, Qualifiers};
use crate::retry::RetryPolicy;
use crate::session::ConnectionSession;
use crate::types::BackoffType;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context(server: &MockServer) -> QueryContext {
    let mut config = ConnectionConfig::new()
        .with_token("u+test")
        .with_api_url(server.uri());
    config.http.requests_per_second = 1000;
    config.http.burst_size = 1000;

    QueryContext::new(Arc::new(ConnectionSession::new(config)))
        .with_retry(RetryPolicy::default().with_max_attempts(3).with_backoff(
            BackoffType::Constant,
            Duration::from_millis(1),
            Duration::from_millis(5),
        ))
        .with_now(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
}

fn table(name: &str) -> Arc<dyn Table> {
    builtin_table(name).unwrap()
}

async fn list(table: &dyn Table, ctx: &QueryContext) -> crate::error::Result<Vec<Row>> {
    let mut sink = CollectSink::new();
    table.list(ctx, &mut sink).await?;
    Ok(sink.into_rows())
}

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_lists_every_table_once() {
    let names: Vec<&str> = builtin_tables().iter().map(|t| t.name()).collect();

    assert_eq!(names.len(), 16);
    let mut sorted = names.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(names, sorted);

    for name in &names {
        assert_eq!(table(name).definition().name, *name);
    }
    assert!(builtin_table("pagerduty_nope").is_none());
}

#[test]
fn test_definitions_describe_keys() {
    let incident = table("pagerduty_incident").definition();
    assert!(incident.supports_get());
    let created_at = incident
        .list_keys
        .iter()
        .find(|k| k.name == "created_at")
        .unwrap();
    assert_eq!(created_at.operators, &[">", ">=", "=", "<", "<="]);
    assert!(incident.column("custom_fields").unwrap().is_hydrated());
    assert!(!incident.column("status").unwrap().is_hydrated());

    let log = table("pagerduty_incident_log").definition();
    assert!(!log.supports_get());
    let required: Vec<&str> = log.required_keys().map(|k| k.name).collect();
    assert_eq!(required, vec!["incident_id"]);

    let integration = table("pagerduty_service_integration").definition();
    assert_eq!(integration.get_keys, vec!["service_id", "id"]);

    assert!(!table("pagerduty_on_call").definition().supports_get());
    assert!(!table("pagerduty_priority").definition().supports_get());
}

#[test]
fn test_every_column_has_a_description() {
    for table in builtin_tables() {
        let definition = table.definition();
        assert!(!definition.description.is_empty(), "{}", definition.name);
        for column in &definition.columns {
            assert!(
                !column.description.is_empty(),
                "{}.{}",
                definition.name,
                column.name
            );
        }
    }
}

// ============================================================================
// Plain listings
// ============================================================================

#[tokio::test]
async fn test_list_projects_fields_and_title() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/vendors",
        json!({
            "vendors": [
                {"id": "PV1", "name": "Datadog", "is_pd_cef": false},
                {"id": "PV2", "name": "Splunk"}
            ],
            "limit": 100, "offset": 0, "more": false
        }),
    )
    .await;

    let ctx = context(&server);
    let rows = list(table("pagerduty_vendor").as_ref(), &ctx).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], json!("PV1"));
    assert_eq!(rows[0]["title"], json!("Datadog"));
    assert_eq!(rows[0]["is_pd_cef"], json!(false));
    assert_eq!(rows[1]["is_pd_cef"], json!(null));
    assert_eq!(rows[1]["description"], json!(null));
}

#[tokio::test]
async fn test_list_pushes_name_into_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services"))
        .and(query_param("query", "Checkout"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "services": [{"id": "PSVC1", "name": "Checkout"}],
            "more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server)
        .with_quals(Qualifiers::new().with_eq("name", "Checkout"))
        .with_columns(["id", "name"]);
    let rows = list(table("pagerduty_service").as_ref(), &ctx).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert!(!rows[0].contains_key("dependencies"));
}

#[tokio::test]
async fn test_user_name_wins_over_email() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("query", "Alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"id": "PU1", "name": "Alice", "email": "alice@example.com"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server)
        .with_quals(
            Qualifiers::new()
                .with_eq("email", "alice@example.com")
                .with_eq("name", "Alice"),
        )
        .with_columns(["id"]);
    let rows = list(table("pagerduty_user").as_ref(), &ctx).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_list_respects_row_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tags"))
        .and(query_param("limit", "1"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tags": [{"id": "PT1", "label": "prod"}],
            "limit": 1, "offset": 0, "more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut sink = CollectSink::with_limit(Some(1));
    let stats = table("pagerduty_tag").list(&ctx, &mut sink).await.unwrap();

    assert_eq!(sink.rows().len(), 1);
    assert_eq!(sink.rows()[0]["title"], json!("prod"));
    assert_eq!(stats.pages_fetched, 1);
    assert!(stats.stopped_early);
}

#[tokio::test]
async fn test_priorities_disabled_yield_no_rows() {
    let server = MockServer::start().await;
    mount_status(&server, "/priorities", 404).await;

    let ctx = context(&server);
    let rows = list(table("pagerduty_priority").as_ref(), &ctx).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_list_server_error_is_fatal() {
    let server = MockServer::start().await;
    mount_status(&server, "/rulesets", 500).await;

    let ctx = context(&server);
    let err = list(table("pagerduty_ruleset").as_ref(), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api { status: 500, .. }));
}

#[tokio::test]
async fn test_list_cancelled_before_start() {
    let server = MockServer::start().await;
    mount_json(&server, "/teams", json!({"teams": []})).await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let ctx = context(&server).with_cancel(cancel);

    let err = list(table("pagerduty_team").as_ref(), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn test_on_call_filters_and_dotted_columns() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oncalls"))
        .and(query_param("schedule_ids[]", "PS1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "oncalls": [{
                "escalation_level": 1,
                "schedule": {"id": "PS1", "type": "schedule_reference"},
                "escalation_policy": {"id": "PEP1"},
                "user": {"id": "PU1", "summary": "Alice"},
                "start": "2024-05-31T00:00:00Z",
                "end": null
            }],
            "more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server).with_quals(Qualifiers::new().with_eq("schedule_id", "PS1"));
    let rows = list(table("pagerduty_on_call").as_ref(), &ctx).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["schedule_id"], json!("PS1"));
    assert_eq!(rows[0]["escalation_policy_id"], json!("PEP1"));
    assert_eq!(rows[0]["user_id"], json!("PU1"));
    assert_eq!(rows[0]["user_on_call"]["summary"], json!("Alice"));
    assert_eq!(rows[0]["end"], json!(null));
}

// ============================================================================
// Incidents and time windows
// ============================================================================

#[tokio::test]
async fn test_incident_window_inside_lookback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/incidents"))
        .and(query_param("since", "2024-05-20T00:00:00Z"))
        .and(query_param("statuses[]", "triggered"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "incidents": [{"id": "PINC1", "summary": "Disk full", "status": "triggered"}],
            "more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server)
        .with_quals(
            Qualifiers::new()
                .with("created_at", Operator::Ge, "2024-05-20T00:00:00Z")
                .with_eq("status", "triggered"),
        )
        .with_columns(["id", "title"]);
    let rows = list(table("pagerduty_incident").as_ref(), &ctx)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], json!("Disk full"));
}

#[tokio::test]
async fn test_incident_old_window_uses_all_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/incidents"))
        .and(query_param("date_range", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "incidents": [], "more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server)
        .with_quals(Qualifiers::new().with("created_at", Operator::Gt, "2023-01-01T00:00:00Z"))
        .with_columns(["id"]);
    let rows = list(table("pagerduty_incident").as_ref(), &ctx)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_incident_get_hydrates_extended_columns() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/incidents/PINC1",
        json!({"incident": {"id": "PINC1", "summary": "Disk full", "incident_number": 7}}),
    )
    .await;
    mount_status(&server, "/incidents/PINC1/custom_fields/values", 404).await;
    mount_json(
        &server,
        "/incidents/PINC1/business_services/impacts",
        json!({"services": [{"id": "PBS1", "name": "Storefront", "status": "impacted"}]}),
    )
    .await;

    let ctx = context(&server).with_quals(Qualifiers::new().with_eq("id", "PINC1"));
    let row = table("pagerduty_incident").get(&ctx).await.unwrap().unwrap();

    assert_eq!(row["incident_number"], json!(7));
    assert_eq!(row["custom_fields"], json!(null));
    assert_eq!(row["business_service_impacts"][0]["id"], json!("PBS1"));
    assert_eq!(row["business_service_impacts"][0]["status"], json!("impacted"));
}

// ============================================================================
// Get
// ============================================================================

#[tokio::test]
async fn test_get_not_found_is_empty() {
    let server = MockServer::start().await;
    mount_status(&server, "/users/PGONE", 404).await;

    let ctx = context(&server).with_quals(Qualifiers::new().with_eq("id", "PGONE"));
    let row = table("pagerduty_user").get(&ctx).await.unwrap();
    assert!(row.is_none());
}

#[tokio::test]
async fn test_get_without_key_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server).with_quals(Qualifiers::new().with_eq("id", ""));
    assert!(table("pagerduty_tag").get(&ctx).await.unwrap().is_none());

    let ctx = context(&server);
    assert!(table("pagerduty_ruleset_rule").get(&ctx).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_unsupported() {
    let server = MockServer::start().await;
    let ctx = context(&server).with_quals(Qualifiers::new().with_eq("id", "X"));

    let err = table("pagerduty_on_call").get(&ctx).await.unwrap_err();
    assert!(matches!(err, Error::Table { .. }));

    let err = table("pagerduty_schedule_user").get(&ctx).await.unwrap_err();
    assert!(matches!(err, Error::Table { .. }));
}

#[tokio::test]
async fn test_get_server_error_propagates() {
    let server = MockServer::start().await;
    mount_status(&server, "/vendors/PV1", 502).await;

    let ctx = context(&server).with_quals(Qualifiers::new().with_eq("id", "PV1"));
    let err = table("pagerduty_vendor").get(&ctx).await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 502, .. }));
}

// ============================================================================
// Hydration
// ============================================================================

#[tokio::test]
async fn test_team_hydration_policies() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/teams",
        json!({"teams": [{"id": "PT1", "name": "Platform"}], "more": false}),
    )
    .await;
    mount_json(
        &server,
        "/teams/PT1/members",
        json!({"members": [{"user": {"id": "PU1"}, "role": "manager"}], "more": false}),
    )
    .await;
    mount_status(&server, "/teams/PT1/tags", 404).await;

    let ctx = context(&server);
    let rows = list(table("pagerduty_team").as_ref(), &ctx).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["members"][0]["role"], json!("manager"));
    assert_eq!(rows[0]["tags"], json!(null));
}

#[tokio::test]
async fn test_team_members_not_found_fails_row() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/teams",
        json!({"teams": [{"id": "PT1", "name": "Platform"}], "more": false}),
    )
    .await;
    mount_status(&server, "/teams/PT1/members", 404).await;

    let ctx = context(&server).with_columns(["id", "members"]);
    let err = list(table("pagerduty_team").as_ref(), &ctx)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Query {
            phase: Phase::Hydrate,
            ..
        }
    ));
    assert!(err.to_string().contains("pagerduty_team.members"));
}

#[tokio::test]
async fn test_unrequested_hydration_is_skipped() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/escalation_policies",
        json!({"escalation_policies": [{"id": "PEP1", "name": "Default"}]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/escalation_policies/PEP1/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tags": []})))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server).with_columns(["id", "name"]);
    let rows = list(table("pagerduty_escalation_policy").as_ref(), &ctx)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert!(!rows[0].contains_key("tags"));
}

#[tokio::test]
async fn test_tags_hydration_pages() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/users",
        json!({"users": [{"id": "PU1", "name": "Alice"}]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/users/PU1/tags"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tags": [{"id": "TG1", "label": "oncall"}],
            "limit": 1, "offset": 0, "more": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/PU1/tags"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tags": [{"id": "TG2", "label": "sre"}],
            "limit": 1, "offset": 1, "more": false
        })))
        .mount(&server)
        .await;

    let ctx = context(&server).with_columns(["id", "tags"]);
    let rows = list(table("pagerduty_user").as_ref(), &ctx).await.unwrap();

    assert_eq!(
        rows[0]["tags"],
        json!([{"id": "TG1", "label": "oncall"}, {"id": "TG2", "label": "sre"}])
    );
}

#[tokio::test]
async fn test_service_dependencies_hydration() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/services",
        json!({"services": [{"id": "PSVC1", "name": "Checkout"}, {"id": "PSVC2", "name": "Search"}]}),
    )
    .await;
    mount_json(
        &server,
        "/service_dependencies/technical_services/PSVC1",
        json!({"relationships": [{
            "id": "D1",
            "type": "service_dependency",
            "supporting_service": {"id": "PSVC9", "type": "technical_service_reference"},
            "dependent_service": {"id": "PSVC1", "type": "technical_service_reference"}
        }]}),
    )
    .await;
    mount_status(&server, "/service_dependencies/technical_services/PSVC2", 404).await;

    let ctx = context(&server).with_columns(["id", "dependencies"]);
    let rows = list(table("pagerduty_service").as_ref(), &ctx).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0]["dependencies"][0]["supporting_service"]["id"],
        json!("PSVC9")
    );
    assert_eq!(rows[1]["dependencies"], json!(null));
}

#[tokio::test]
async fn test_schedule_detail_fetched_once_per_row() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/schedules",
        json!({"schedules": [{"id": "PS1", "name": "Primary"}]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/schedules/PS1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schedule": {
                "id": "PS1",
                "name": "Primary",
                "final_schedule": {"name": "Final Schedule"},
                "override_subschedule": {"name": "Overrides"},
                "schedule_layers": [{"id": "L1"}]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let rows = list(table("pagerduty_schedule").as_ref(), &ctx).await.unwrap();

    assert_eq!(rows[0]["final_schedule"]["name"], json!("Final Schedule"));
    assert_eq!(rows[0]["override_sub_schedule"]["name"], json!("Overrides"));
    assert_eq!(rows[0]["schedule_layers"][0]["id"], json!("L1"));
}

#[tokio::test]
async fn test_schedule_get_reuses_full_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schedules/PS1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schedule": {
                "id": "PS1",
                "name": "Primary",
                "final_schedule": {},
                "override_subschedule": {},
                "schedule_layers": []
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server).with_quals(Qualifiers::new().with_eq("id", "PS1"));
    let row = table("pagerduty_schedule").get(&ctx).await.unwrap().unwrap();
    assert_eq!(row["schedule_layers"], json!([]));
}

// ============================================================================
// Nested tables
// ============================================================================

#[tokio::test]
async fn test_incident_log_requires_incident_id() {
    let server = MockServer::start().await;
    let ctx = context(&server);

    let err = list(table("pagerduty_incident_log").as_ref(), &ctx)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Table { .. }));
    assert!(err.to_string().contains("incident_id"));
}

#[tokio::test]
async fn test_incident_log_keeps_old_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/incidents/PINC1/log_entries"))
        .and(query_param("since", "2023-01-01T00:00:01Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "log_entries": [
                {"id": "LE1", "type": "trigger_log_entry"},
                {"id": "LE2", "type": "resolve_log_entry"}
            ],
            "more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server).with_quals(
        Qualifiers::new()
            .with_eq("incident_id", "PINC1")
            .with("created_at", Operator::Gt, "2023-01-01T00:00:00Z"),
    );
    let rows = list(table("pagerduty_incident_log").as_ref(), &ctx)
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["incident_id"], json!("PINC1"));
    assert_eq!(rows[1]["title"], json!("LE2"));
}

#[tokio::test]
async fn test_ruleset_rules_fan_out() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/rulesets",
        json!({"rulesets": [{"id": "R1"}, {"id": "R2"}], "more": false}),
    )
    .await;
    mount_json(
        &server,
        "/rulesets/R1/rules",
        json!({"rules": [{"id": "RR1", "position": 0}]}),
    )
    .await;
    mount_json(
        &server,
        "/rulesets/R2/rules",
        json!({"rules": [{"id": "RR2", "position": 0}, {"id": "RR3", "catch_all": true}]}),
    )
    .await;

    let ctx = context(&server);
    let mut sink = CollectSink::new();
    let stats = table("pagerduty_ruleset_rule")
        .list(&ctx, &mut sink)
        .await
        .unwrap();
    let rows = sink.into_rows();

    let ids: Vec<_> = rows.iter().map(|r| (r["ruleset_id"].clone(), r["id"].clone())).collect();
    assert_eq!(
        ids,
        vec![
            (json!("R1"), json!("RR1")),
            (json!("R2"), json!("RR2")),
            (json!("R2"), json!("RR3")),
        ]
    );
    assert_eq!(stats.items_emitted, 3);
    assert_eq!(stats.pages_fetched, 2);
}

#[tokio::test]
async fn test_ruleset_rules_stop_between_parents() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/rulesets",
        json!({"rulesets": [{"id": "R1"}, {"id": "R2"}]}),
    )
    .await;
    mount_json(&server, "/rulesets/R1/rules", json!({"rules": [{"id": "RR1"}]})).await;
    Mock::given(method("GET"))
        .and(path("/rulesets/R2/rules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rules": []})))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut sink = CollectSink::with_limit(Some(1));
    let stats = table("pagerduty_ruleset_rule")
        .list(&ctx, &mut sink)
        .await
        .unwrap();

    assert_eq!(sink.rows().len(), 1);
    assert!(stats.stopped_early);
}

#[tokio::test]
async fn test_ruleset_rule_get() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/rulesets/R1/rules/RR1",
        json!({"rule": {"id": "RR1", "disabled": true}}),
    )
    .await;

    let ctx = context(&server).with_quals(
        Qualifiers::new()
            .with_eq("ruleset_id", "R1")
            .with_eq("id", "RR1"),
    );
    let row = table("pagerduty_ruleset_rule").get(&ctx).await.unwrap().unwrap();
    assert_eq!(row["ruleset_id"], json!("R1"));
    assert_eq!(row["disabled"], json!(true));
}

#[tokio::test]
async fn test_ruleset_rule_get_escapes_both_ids() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/rulesets/R1%2Frules%2FRR9/rules/RR1%3Fx",
        json!({"rule": {"id": "RR1?x", "disabled": false}}),
    )
    .await;

    let ctx = context(&server).with_quals(
        Qualifiers::new()
            .with_eq("ruleset_id", "R1/rules/RR9")
            .with_eq("id", "RR1?x"),
    );
    let row = table("pagerduty_ruleset_rule").get(&ctx).await.unwrap().unwrap();
    assert_eq!(row["id"], json!("RR1?x"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_schedule_users_for_one_schedule() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/schedules/PS1",
        json!({"schedule": {"id": "PS1", "name": "Primary"}}),
    )
    .await;
    mount_json(
        &server,
        "/schedules/PS1/users",
        json!({"users": [
            {"id": "PU1", "name": "Alice", "email": "alice@example.com"},
            {"id": "PU2", "name": "Bob"}
        ]}),
    )
    .await;

    let ctx = context(&server).with_quals(Qualifiers::new().with_eq("schedule_id", "PS1"));
    let rows = list(table("pagerduty_schedule_user").as_ref(), &ctx)
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["schedule_id"], json!("PS1"));
    assert_eq!(rows[0]["schedule_name"], json!("Primary"));
    assert_eq!(rows[0]["email"], json!("alice@example.com"));
    assert_eq!(rows[1]["title"], json!("Bob"));
}

#[tokio::test]
async fn test_schedule_users_missing_schedule_is_empty() {
    let server = MockServer::start().await;
    mount_status(&server, "/schedules/PGONE", 404).await;

    let ctx = context(&server).with_quals(Qualifiers::new().with_eq("schedule_id", "PGONE"));
    let rows = list(table("pagerduty_schedule_user").as_ref(), &ctx)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_schedule_users_skip_vanished_schedule() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/schedules",
        json!({"schedules": [{"id": "PS1", "name": "Gone"}, {"id": "PS2", "name": "Here"}]}),
    )
    .await;
    mount_status(&server, "/schedules/PS1/users", 404).await;
    mount_json(
        &server,
        "/schedules/PS2/users",
        json!({"users": [{"id": "PU1", "name": "Alice"}]}),
    )
    .await;

    let ctx = context(&server);
    let rows = list(table("pagerduty_schedule_user").as_ref(), &ctx)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["schedule_name"], json!("Here"));
}

#[tokio::test]
async fn test_service_integrations_from_service() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/PSVC1"))
        .and(query_param("include[]", "integrations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "service": {
                "id": "PSVC1",
                "integrations": [
                    {"id": "PI1", "name": "Datadog", "integration_key": "abc"},
                    {"id": "PI2", "name": "Email", "integration_email": "svc@example.com"}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server).with_quals(Qualifiers::new().with_eq("service_id", "PSVC1"));
    let rows = list(table("pagerduty_service_integration").as_ref(), &ctx)
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["service_id"], json!("PSVC1"));
    assert_eq!(rows[0]["integration_key"], json!("abc"));
    assert_eq!(rows[1]["title"], json!("Email"));
}

#[tokio::test]
async fn test_service_integrations_missing_service_is_empty() {
    let server = MockServer::start().await;
    mount_status(&server, "/services/PGONE", 404).await;

    let ctx = context(&server).with_quals(Qualifiers::new().with_eq("service_id", "PGONE"));
    let rows = list(table("pagerduty_service_integration").as_ref(), &ctx)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_service_integration_get() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/services/PSVC1/integrations/PI1",
        json!({"integration": {"id": "PI1", "name": "Datadog"}}),
    )
    .await;

    let ctx = context(&server).with_quals(
        Qualifiers::new()
            .with_eq("service_id", "PSVC1")
            .with_eq("id", "PI1"),
    );
    let row = table("pagerduty_service_integration")
        .get(&ctx)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row["service_id"], json!("PSVC1"));
    assert_eq!(row["name"], json!("Datadog"));
}
