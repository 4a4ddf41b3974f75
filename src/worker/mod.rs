//! Typed HTTP client for the memory worker.
//!
//! Every call is bounded by a per-call deadline enforced with
//! [`tokio::time::timeout`] around both the request and the body read, so a
//! timeout cancels exactly the call that exceeded it. Mutating and read calls
//! return [`WorkerError`]; the health and readiness probes never fail.
//! [`WorkerClient::wait_for_ready`] is the only call that retries.

pub mod error;
pub mod types;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::config::{WorkerConfig, DEFAULT_WORKER_PORT};

pub use error::{WorkerError, WorkerResult};
pub use types::{
    HealthStatus, InitSessionRequest, InitSessionResponse, Observation, SearchOptions,
    SearchResults, DEFAULT_SEARCH_LIMIT, DEFAULT_TIMELINE_WINDOW,
};

#[derive(Debug, Clone)]
pub struct WorkerClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    health_timeout: Duration,
    poll_interval: Duration,
}

impl WorkerClient {
    pub fn new(config: &WorkerConfig) -> WorkerResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("membridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(WorkerError::Client)?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            health_timeout: config.health_timeout(),
            poll_interval: config.poll_interval(),
        })
    }

    /// Client for `url` with default deadlines.
    pub fn from_url(url: impl Into<String>) -> WorkerResult<Self> {
        let config = WorkerConfig {
            url: url.into(),
            ..WorkerConfig::default()
        };
        Self::new(&config)
    }

    /// Client for a worker on `127.0.0.1:<port>` with default deadlines.
    pub fn from_port(port: u16) -> WorkerResult<Self> {
        Self::from_url(format!("http://127.0.0.1:{port}"))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Port from the base URL, or the default worker port when it has none.
    pub fn port(&self) -> u16 {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.port())
            .unwrap_or(DEFAULT_WORKER_PORT)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── probes ──────────────────────────────────────────────────────────

    /// Full health payload. Never fails: unreachable or unparseable workers
    /// yield [`HealthStatus::unreachable`].
    pub async fn check_health(&self) -> HealthStatus {
        let request = self.http.get(self.url("/api/health"));
        let exchange = async {
            let response = request.send().await?;
            Ok::<_, reqwest::Error>(response.bytes().await?)
        };

        match tokio::time::timeout(self.health_timeout, exchange).await {
            Ok(Ok(body)) => match serde_json::from_slice::<HealthStatus>(&body) {
                Ok(health) => health,
                Err(e) => {
                    debug!(error = %e, "health check returned an unparseable body");
                    HealthStatus::unreachable()
                }
            },
            Ok(Err(e)) => {
                debug!(error = %e, "health check failed");
                HealthStatus::unreachable()
            }
            Err(_) => {
                debug!(
                    timeout_ms = self.health_timeout.as_millis() as u64,
                    "health check timed out"
                );
                HealthStatus::unreachable()
            }
        }
    }

    /// `true` iff the worker reports `ok` or omits its status.
    pub async fn health_check(&self) -> bool {
        self.check_health().await.is_ok()
    }

    /// Whether the worker currently accepts requests (2xx from `/api/readiness`).
    pub async fn readiness_check(&self) -> bool {
        self.readiness_within(self.health_timeout).await
    }

    async fn readiness_within(&self, deadline: Duration) -> bool {
        let request = self.http.get(self.url("/api/readiness"));
        match tokio::time::timeout(deadline, request.send()).await {
            Ok(Ok(response)) => response.status().is_success(),
            Ok(Err(e)) => {
                debug!(error = %e, "readiness check failed");
                false
            }
            Err(_) => false,
        }
    }

    /// Poll `/api/readiness` until it passes or `timeout` elapses. Returns
    /// `false` on exhaustion.
    ///
    /// No readiness request or sleep outlasts the remaining budget, so a
    /// stalled worker cannot stretch the wait past `timeout`.
    pub async fn wait_for_ready(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return false;
            }
            if self.readiness_within(self.health_timeout.min(remaining)).await {
                debug!(elapsed_ms = start.elapsed().as_millis() as u64, "worker ready");
                return true;
            }
            let remaining = timeout.saturating_sub(start.elapsed());
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }

    // ── session lifecycle ───────────────────────────────────────────────

    pub async fn init_session(
        &self,
        host_session_id: &str,
        project: &str,
        prompt: &str,
    ) -> WorkerResult<InitSessionResponse> {
        const OP: &str = "session init";
        let body = InitSessionRequest {
            content_session_id: host_session_id.to_string(),
            project: project.to_string(),
            prompt: prompt.to_string(),
        };
        let request = self.http.post(self.url("/api/sessions/init")).json(&body);
        let text = self.call(OP, request).await?;
        decode(OP, &text)
    }

    /// Submit one observation. Not retried.
    pub async fn add_observation(&self, observation: &Observation) -> WorkerResult<()> {
        let request = self
            .http
            .post(self.url("/api/sessions/observations"))
            .json(observation);
        self.call("observation add", request).await?;
        Ok(())
    }

    /// Mark a worker session complete, which triggers summarization on the worker.
    pub async fn complete_session(&self, session_db_id: i64) -> WorkerResult<()> {
        let request = self
            .http
            .post(self.url(&format!("/sessions/{session_db_id}/complete")));
        self.call("session complete", request).await?;
        Ok(())
    }

    // ── retrieval ───────────────────────────────────────────────────────

    /// Pre-rendered memory context for a project, as plain text.
    pub async fn get_project_context(&self, project: &str) -> WorkerResult<String> {
        let request = self
            .http
            .get(self.url("/api/context/inject"))
            .query(&[("project", project)]);
        self.call("context fetch", request).await
    }

    pub async fn search(&self, query: &str, options: &SearchOptions) -> WorkerResult<SearchResults> {
        const OP: &str = "search";
        let limit = options.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).to_string();
        let mut params: Vec<(&str, &str)> = vec![("q", query), ("limit", limit.as_str())];
        if let Some(kind) = options.kind.as_deref() {
            params.push(("type", kind));
        }
        if let Some(project) = options.project.as_deref() {
            params.push(("project", project));
        }

        let request = self.http.get(self.url("/api/search")).query(&params);
        let text = self.call(OP, request).await?;
        decode(OP, &text)
    }

    /// Shorthand for [`search`](Self::search) without a project filter.
    pub async fn search_memories(
        &self,
        query: &str,
        kind: Option<&str>,
        limit: Option<u32>,
    ) -> WorkerResult<SearchResults> {
        let options = SearchOptions {
            limit,
            kind: kind.map(str::to_string),
            project: None,
        };
        self.search(query, &options).await
    }

    /// Full observation records for the given ids.
    pub async fn get_observations(&self, ids: &[i64]) -> WorkerResult<Vec<Value>> {
        const OP: &str = "get observations";
        let request = self
            .http
            .post(self.url("/api/observations/batch"))
            .json(&types::ObservationBatchRequest { ids });
        let text = self.call(OP, request).await?;
        decode(OP, &text)
    }

    /// Observations surrounding `observation_id` within a session.
    pub async fn get_timeline(
        &self,
        session_db_id: i64,
        observation_id: i64,
        window: Option<u32>,
    ) -> WorkerResult<Value> {
        const OP: &str = "timeline fetch";
        let window = window.unwrap_or(DEFAULT_TIMELINE_WINDOW);
        let request = self.http.get(self.url("/api/timeline")).query(&[
            ("session", session_db_id.to_string()),
            ("observation", observation_id.to_string()),
            ("window", window.to_string()),
        ]);
        let text = self.call(OP, request).await?;
        decode(OP, &text)
    }

    /// Send `request`, require a success status, and read the body, all under
    /// the per-call deadline.
    async fn call(&self, operation: &'static str, request: RequestBuilder) -> WorkerResult<String> {
        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|source| network_error(operation, source))?;

            let status = response.status();
            if !status.is_success() {
                return Err(WorkerError::Status {
                    operation,
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or("").to_string(),
                });
            }

            response
                .text()
                .await
                .map_err(|source| network_error(operation, source))
        };

        let result = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(WorkerError::Timeout {
                operation,
                after: self.timeout,
            }),
        };
        debug!(operation, ok = result.is_ok(), "worker call finished");
        result
    }
}

fn network_error(operation: &'static str, source: reqwest::Error) -> WorkerError {
    WorkerError::Network { operation, source }
}

fn decode<T: DeserializeOwned>(operation: &'static str, body: &str) -> WorkerResult<T> {
    serde_json::from_str(body).map_err(|source| WorkerError::Decode { operation, source })
}
