//! Wire types for the worker HTTP API.
//!
//! Field names follow the worker's camelCase JSON; the Rust side stays snake_case.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /api/health` response.
///
/// Every field is optional on the wire; a worker that omits `status` is
/// treated as healthy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
}

impl HealthStatus {
    /// Sentinel returned when the worker cannot be reached or answers garbage.
    pub fn unreachable() -> Self {
        Self {
            status: Some("error".into()),
            version: Some("unknown".into()),
            api_version: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status.as_deref(), None | Some("ok"))
    }
}

/// `POST /api/sessions/init` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitSessionRequest {
    pub content_session_id: String,
    pub project: String,
    pub prompt: String,
}

/// `POST /api/sessions/init` response.
///
/// `skipped = true` means the session opted out of capture. It is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitSessionResponse {
    pub session_db_id: i64,
    pub prompt_number: u32,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// One captured tool invocation, built fresh per event and dropped after submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub session_db_id: i64,
    pub prompt_number: u32,
    pub tool_name: String,
    pub tool_input: Value,
    pub tool_output: String,
    pub cwd: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Query options for `GET /api/search`.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Defaults to [`DEFAULT_SEARCH_LIMIT`] when unset.
    pub limit: Option<u32>,
    pub kind: Option<String>,
    pub project: Option<String>,
}

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// `GET /api/search` response. Result items are passed through untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ObservationBatchRequest<'a> {
    pub ids: &'a [i64],
}

/// Window used by `GET /api/timeline` when the caller has no preference.
pub const DEFAULT_TIMELINE_WINDOW: u32 = 5;
