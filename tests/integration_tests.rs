//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: connector → session → HTTP requests → rows

use chrono::{TimeZone, Utc};
use pagerduty_tables::config::{ConnectionConfig, RetrySettings};
use pagerduty_tables::error::{Error, ErrorKind, Phase};
use pagerduty_tables::filter::{Operator, Qualifiers};
use pagerduty_tables::session::ConnectionSession;
use pagerduty_tables::tables::CollectSink;
use pagerduty_tables::types::BackoffType;
use pagerduty_tables::Connector;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> ConnectionConfig {
    let mut config = ConnectionConfig::new()
        .with_token("u+integration")
        .with_api_url(server.uri())
        .with_retry(RetrySettings {
            max_attempts: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            backoff_type: BackoffType::Constant,
        });
    config.http.requests_per_second = 1000;
    config.http.burst_size = 1000;
    config
}

fn connector(server: &MockServer) -> Connector {
    Connector::new(config(server))
}

// ============================================================================
// Check
// ============================================================================

#[tokio::test]
async fn test_check_succeeds_with_valid_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("limit", "1"))
        .and(header("Authorization", "Token token=u+integration"))
        .and(header("Accept", "application/vnd.pagerduty+json;version=2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"id": "PU1", "name": "Ada"}],
            "more": true,
            "limit": 1,
            "offset": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector(&server);
    let result = connector.check(&connector.context()).await;

    assert!(result.success, "{:?}", result.message);
}

#[tokio::test]
async fn test_check_reports_rejected_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Unauthorized", "code": 2006}
        })))
        .mount(&server)
        .await;

    let connector = connector(&server);
    let result = connector.check(&connector.context()).await;

    assert!(!result.success);
    assert!(result.message.unwrap().contains("401"));
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn test_list_pages_through_users() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [
                {"id": "PU1", "name": "Ada", "email": "ada@example.com"},
                {"id": "PU2", "name": "Grace", "email": "grace@example.com"}
            ],
            "more": true,
            "limit": 2,
            "offset": 0
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"id": "PU3", "name": "Linus", "email": "linus@example.com"}],
            "more": false,
            "limit": 2,
            "offset": 2
        })))
        .mount(&server)
        .await;

    let connector = connector(&server);
    let ctx = connector.context().with_columns(["id", "title", "email"]);
    let mut sink = CollectSink::new();

    let stats = connector
        .list("pagerduty_user", &ctx, &mut sink)
        .await
        .unwrap();

    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.items_emitted, 3);
    assert!(!stats.stopped_early);

    let ids: Vec<_> = sink.rows().iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!("PU1"), json!("PU2"), json!("PU3")]);
    assert_eq!(sink.rows()[1]["title"], json!("Grace"));
}

#[tokio::test]
async fn test_list_pushes_down_incident_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/incidents"))
        .and(query_param("statuses[]", "resolved"))
        .and(query_param("since", "2024-05-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "incidents": [{
                "id": "PI1",
                "summary": "Disk full",
                "status": "resolved",
                "created_at": "2024-05-02T10:00:00Z"
            }],
            "more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector(&server);
    let quals = Qualifiers::new()
        .with_eq("status", "resolved")
        .with("created_at", Operator::Ge, "2024-05-01T00:00:00Z");
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let ctx = connector
        .context()
        .with_quals(quals)
        .with_columns(["id", "title", "status"])
        .with_now(now);
    let mut sink = CollectSink::new();

    connector
        .list("pagerduty_incident", &ctx, &mut sink)
        .await
        .unwrap();

    assert_eq!(sink.rows().len(), 1);
    assert_eq!(sink.rows()[0]["title"], json!("Disk full"));
}

#[tokio::test]
async fn test_list_retries_rate_limited_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vendors"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/vendors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vendors": [{"id": "PV1", "name": "Datadog"}],
            "more": false
        })))
        .mount(&server)
        .await;

    let connector = connector(&server);
    let mut sink = CollectSink::new();

    connector
        .list("pagerduty_vendor", &connector.context(), &mut sink)
        .await
        .unwrap();

    assert_eq!(sink.rows().len(), 1);
}

#[tokio::test]
async fn test_list_rate_limit_exhaustion_is_query_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vendors"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let connector = connector(&server);
    let mut sink = CollectSink::new();

    let err = connector
        .list("pagerduty_vendor", &connector.context(), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Query {
            phase: Phase::Query,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert!(err.to_string().starts_with("pagerduty_vendor.list (query_error)"));
}

#[tokio::test]
async fn test_list_server_error_is_query_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let connector = connector(&server);
    let ctx = connector.context().with_columns(["id"]);
    let mut sink = CollectSink::new();

    let err = connector
        .list("pagerduty_service", &ctx, &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Query {
            phase: Phase::Query,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::TransportOrProtocol);
    assert!(sink.rows().is_empty());
}

#[tokio::test]
async fn test_missing_token_is_connection_error() {
    let server = MockServer::start().await;

    let mut config = config(&server);
    config.token = None;
    let session = ConnectionSession::new(config).with_env_var("PAGERDUTY_TABLES_IT_UNSET_TOKEN");
    let connector = Connector::with_session(Arc::new(session));
    let mut sink = CollectSink::new();

    let err = connector
        .list("pagerduty_team", &connector.context(), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Query {
            phase: Phase::Connection,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::MissingCredential);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_unknown_table() {
    let server = MockServer::start().await;
    let connector = connector(&server);
    let mut sink = CollectSink::new();

    let err = connector
        .list("pagerduty_widget", &connector.context(), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Table { .. }));
}

// ============================================================================
// Get
// ============================================================================

#[tokio::test]
async fn test_get_returns_row() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vendors/PV1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vendor": {"id": "PV1", "name": "Datadog", "is_pd_cef": true}
        })))
        .mount(&server)
        .await;

    let connector = connector(&server);
    let ctx = connector
        .context()
        .with_quals(Qualifiers::new().with_eq("id", "PV1"));

    let row = connector.get("pagerduty_vendor", &ctx).await.unwrap().unwrap();

    assert_eq!(row["name"], json!("Datadog"));
    assert_eq!(row["title"], json!("Datadog"));
}

#[tokio::test]
async fn test_get_missing_row_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/PNOPE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"message": "Not Found", "code": 2100}
        })))
        .mount(&server)
        .await;

    let connector = connector(&server);
    let ctx = connector
        .context()
        .with_quals(Qualifiers::new().with_eq("id", "PNOPE"))
        .with_columns(["id", "name"]);

    let row = connector.get("pagerduty_user", &ctx).await.unwrap();

    assert!(row.is_none());
}

#[tokio::test]
async fn test_get_keeps_id_within_one_path_segment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/..%2Fteams%2FPT1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"message": "Not Found", "code": 2100}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/teams/PT1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "team": {"id": "PT1", "name": "Platform"}
        })))
        .expect(0)
        .mount(&server)
        .await;

    let connector = connector(&server);
    let ctx = connector
        .context()
        .with_quals(Qualifiers::new().with_eq("id", "../teams/PT1"))
        .with_columns(["id", "name"]);

    let row = connector.get("pagerduty_user", &ctx).await.unwrap();

    assert!(row.is_none());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/users/..%2Fteams%2FPT1");
}

// ============================================================================
// Config Files
// ============================================================================

#[tokio::test]
async fn test_connector_from_yaml_config() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tags"))
        .and(header("Authorization", "Token token=u+from-file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tags": [{"id": "PT1", "label": "prod"}],
            "more": false
        })))
        .mount(&server)
        .await;

    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "token: u+from-file\napi_url_override: {}\nhttp:\n  requests_per_second: 100\n  burst_size: 100",
        server.uri()
    )
    .unwrap();

    let config = ConnectionConfig::from_file(file.path()).unwrap();
    let connector = Connector::new(config);
    let mut sink = CollectSink::new();

    connector
        .list("pagerduty_tag", &connector.context(), &mut sink)
        .await
        .unwrap();

    assert_eq!(sink.rows().len(), 1);
    assert_eq!(sink.rows()[0]["title"], json!("prod"));
}
