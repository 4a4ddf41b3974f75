mod helpers;

use std::time::{Duration, Instant};

use helpers::{client_for, requests_to, worker_config, UNREACHABLE_URL};
use membridge::worker::{Observation, SearchOptions, WorkerClient, WorkerError};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn check_health_returns_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "version": "1.0.0",
            "apiVersion": "1.0"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let health = client.check_health().await;
    assert_eq!(health.status.as_deref(), Some("ok"));
    assert_eq!(health.version.as_deref(), Some("1.0.0"));
    assert_eq!(health.api_version.as_deref(), Some("1.0"));
    assert!(client.health_check().await);
}

#[tokio::test]
async fn check_health_on_unreachable_worker_returns_sentinel() {
    let client = client_for(UNREACHABLE_URL);
    let health = client.check_health().await;
    assert_eq!(health.status.as_deref(), Some("error"));
    assert_eq!(health.version.as_deref(), Some("unknown"));
    assert!(!client.health_check().await);
}

#[tokio::test]
async fn check_health_with_garbage_body_returns_sentinel() {
    let server = MockServer::start().await;
    Mock::given(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let health = client_for(&server.uri()).check_health().await;
    assert_eq!(health.status.as_deref(), Some("error"));
}

#[tokio::test]
async fn health_without_status_counts_as_healthy() {
    let server = MockServer::start().await;
    Mock::given(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "2.0.0"})))
        .mount(&server)
        .await;
    Mock::given(path("/api/readiness"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    assert!(client.health_check().await);
    assert!(client.readiness_check().await);
}

#[tokio::test]
async fn readiness_fails_on_error_status_and_unreachable() {
    let server = MockServer::start().await;
    Mock::given(path("/api/readiness"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(!client_for(&server.uri()).readiness_check().await);
    assert!(!client_for(UNREACHABLE_URL).readiness_check().await);
}

#[tokio::test]
async fn wait_for_ready_succeeds_when_worker_is_ready() {
    let server = MockServer::start().await;
    Mock::given(path("/api/readiness"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    assert!(client.wait_for_ready(Duration::from_secs(2)).await);
}

#[tokio::test]
async fn wait_for_ready_gives_up_after_budget() {
    let server = MockServer::start().await;
    Mock::given(path("/api/readiness"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let start = Instant::now();
    assert!(!client.wait_for_ready(Duration::from_millis(300)).await);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");

    // 50ms poll interval over 300ms
    let polls = requests_to(&server, "/api/readiness").await.len();
    assert!(polls >= 2, "only {polls} polls");
}

#[tokio::test]
async fn wait_for_ready_budget_caps_a_stalled_endpoint() {
    let server = MockServer::start().await;
    Mock::given(path("/api/readiness"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let mut config = worker_config(&server.uri());
    config.health_timeout_ms = 5_000;
    let client = WorkerClient::new(&config).unwrap();

    let start = Instant::now();
    assert!(!client.wait_for_ready(Duration::from_millis(300)).await);
    let elapsed = start.elapsed();
    assert!(elapsed < Duration::from_secs(1), "took {elapsed:?}");
}

#[tokio::test]
async fn init_session_sends_contract_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sessions/init"))
        .and(body_json(json!({
            "contentSessionId": "host-1",
            "project": "my app",
            "prompt": ""
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessionDbId": 123,
            "promptNumber": 1,
            "skipped": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server.uri())
        .init_session("host-1", "my app", "")
        .await
        .unwrap();
    assert_eq!(response.session_db_id, 123);
    assert_eq!(response.prompt_number, 1);
    assert!(!response.skipped);
}

#[tokio::test]
async fn init_session_skipped_is_not_an_error() {
    let server = MockServer::start().await;
    helpers::mount_init(&server, 9, 1, true).await;

    let response = client_for(&server.uri())
        .init_session("host-2", "app", "title")
        .await
        .unwrap();
    assert!(response.skipped);
    assert_eq!(response.reason.as_deref(), Some("private session"));
}

#[tokio::test]
async fn init_session_error_status_is_typed() {
    let server = MockServer::start().await;
    Mock::given(path("/api/sessions/init"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server.uri())
        .init_session("host-1", "app", "t")
        .await
        .unwrap_err();
    match err {
        WorkerError::Status {
            status,
            ref status_text,
            ..
        } => {
            assert_eq!(status, 500);
            assert_eq!(status_text, "Internal Server Error");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn init_session_with_unexpected_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(path("/api/sessions/init"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let err = client_for(&server.uri())
        .init_session("host-1", "app", "t")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::Decode { .. }), "got {err:?}");
}

#[tokio::test]
async fn slow_call_times_out_distinctly() {
    let server = MockServer::start().await;
    Mock::given(path("/api/sessions/init"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut config = helpers::worker_config(&server.uri());
    config.timeout_ms = 200;
    let client = WorkerClient::new(&config).unwrap();

    let start = Instant::now();
    let err = client.init_session("host-1", "app", "t").await.unwrap_err();
    assert!(err.is_timeout(), "got {err:?}");
    assert_eq!(err.status(), None);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn unreachable_worker_is_network_error() {
    let err = client_for(UNREACHABLE_URL)
        .complete_session(1)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::Network { .. }), "got {err:?}");
    assert_eq!(err.category(), "network");
}

#[tokio::test]
async fn add_observation_posts_camel_case_payload() {
    let server = MockServer::start().await;
    helpers::mount_observations(&server, 1).await;

    let observation = Observation {
        session_db_id: 7,
        prompt_number: 2,
        tool_name: "bash".into(),
        tool_input: json!({"command": "ls -la"}),
        tool_output: "file1.txt\nfile2.txt".into(),
        cwd: "/test".into(),
        timestamp: 1_700_000_000_000,
    };
    client_for(&server.uri())
        .add_observation(&observation)
        .await
        .unwrap();

    let requests = requests_to(&server, "/api/sessions/observations").await;
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["sessionDbId"], 7);
    assert_eq!(body["promptNumber"], 2);
    assert_eq!(body["toolInput"]["command"], "ls -la");
    assert_eq!(body["cwd"], "/test");
}

#[tokio::test]
async fn add_observation_error_status() {
    let server = MockServer::start().await;
    Mock::given(path("/api/sessions/observations"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;

    let observation = Observation {
        session_db_id: 1,
        prompt_number: 1,
        tool_name: "read".into(),
        tool_input: Value::Null,
        tool_output: String::new(),
        cwd: "/".into(),
        timestamp: 0,
    };
    let err = client_for(&server.uri())
        .add_observation(&observation)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
}

#[tokio::test]
async fn complete_session_hits_unprefixed_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sessions/42/complete"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server.uri()).complete_session(42).await.unwrap();
}

#[tokio::test]
async fn complete_unknown_session_is_error() {
    let server = MockServer::start().await;
    Mock::given(path("/sessions/999/complete"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server.uri())
        .complete_session(999)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "session complete failed: 404 Not Found");
}

#[tokio::test]
async fn project_context_encodes_project() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/context/inject"))
        .and(query_param("project", "my project & co"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Test memory context"))
        .mount(&server)
        .await;

    let context = client_for(&server.uri())
        .get_project_context("my project & co")
        .await
        .unwrap();
    assert_eq!(context, "Test memory context");
}

#[tokio::test]
async fn search_sends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("q", "tokio runtime"))
        .and(query_param("limit", "3"))
        .and(query_param("type", "bash"))
        .and(query_param("project", "app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1, "toolName": "bash", "summary": "Test command"}],
            "total": 1
        })))
        .mount(&server)
        .await;

    let options = SearchOptions {
        limit: Some(3),
        kind: Some("bash".into()),
        project: Some("app".into()),
    };
    let results = client_for(&server.uri())
        .search("tokio runtime", &options)
        .await
        .unwrap();
    assert_eq!(results.total, 1);
    assert_eq!(results.results[0]["toolName"], "bash");
}

#[tokio::test]
async fn search_memories_defaults_limit() {
    let server = MockServer::start().await;
    Mock::given(path("/api/search"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [], "total": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let results = client_for(&server.uri())
        .search_memories("nothing here", None, None)
        .await
        .unwrap();
    assert!(results.results.is_empty());

    let requests = requests_to(&server, "/api/search").await;
    assert!(!requests[0].url.query_pairs().any(|(k, _)| k == "type"));
}

#[tokio::test]
async fn batch_observations_and_timeline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/observations/batch"))
        .and(body_json(json!({"ids": [1, 2]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/timeline"))
        .and(query_param("session", "4"))
        .and(query_param("observation", "2"))
        .and(query_param("window", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"before": [], "after": []})))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let batch = client.get_observations(&[1, 2]).await.unwrap();
    assert_eq!(batch.len(), 2);

    let timeline = client.get_timeline(4, 2, None).await.unwrap();
    assert!(timeline.get("before").is_some());
}
