#![allow(dead_code)]

use std::sync::Arc;

use membridge::bridge::{EventBridge, MessagePart, SessionInfo, SessionTime};
use membridge::config::WorkerConfig;
use membridge::worker::WorkerClient;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Worker URL nothing listens on.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

/// Worker config with deadlines short enough for tests.
pub fn worker_config(url: &str) -> WorkerConfig {
    WorkerConfig {
        url: url.to_string(),
        timeout_ms: 2_000,
        health_timeout_ms: 500,
        ready_timeout_ms: 1_000,
        poll_interval_ms: 50,
    }
}

pub fn client_for(url: &str) -> Arc<WorkerClient> {
    Arc::new(WorkerClient::new(&worker_config(url)).unwrap())
}

pub fn bridge_for(server: &MockServer) -> EventBridge {
    EventBridge::new(client_for(&server.uri())).with_fallback_cwd("/fallback")
}

/// Answer `POST /api/sessions/init` with the given assignment.
pub async fn mount_init(server: &MockServer, session_db_id: i64, prompt_number: u32, skipped: bool) {
    let mut body = json!({
        "sessionDbId": session_db_id,
        "promptNumber": prompt_number,
        "skipped": skipped,
    });
    if skipped {
        body["reason"] = json!("private session");
    }
    Mock::given(method("POST"))
        .and(path("/api/sessions/init"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Accept observations, expecting exactly `times` of them.
pub async fn mount_observations(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/sessions/observations"))
        .respond_with(ResponseTemplate::new(200))
        .expect(times)
        .mount(server)
        .await;
}

pub fn session_info(id: &str, directory: &str) -> SessionInfo {
    SessionInfo {
        id: id.to_string(),
        directory: directory.to_string(),
        title: Some("Fix the flaky test".to_string()),
        time: SessionTime::default(),
    }
}

pub fn archived(id: &str) -> SessionInfo {
    SessionInfo {
        id: id.to_string(),
        directory: "/work/app".to_string(),
        title: None,
        time: SessionTime {
            created: Some(1_700_000_000_000),
            archived: Some(1_700_000_100_000),
        },
    }
}

pub fn tool_part(session_id: &str, name: &str, args: Value, result: &str) -> MessagePart {
    MessagePart {
        kind: "tool_call".to_string(),
        session_id: session_id.to_string(),
        name: name.to_string(),
        args,
        result: Some(result.to_string()),
        cwd: Some("/work/app".to_string()),
        status: None,
    }
}

/// Requests the server has seen for `request_path`, in arrival order.
pub async fn requests_to(server: &MockServer, request_path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == request_path)
        .collect()
}
