//! Worker client error types.

use std::time::Duration;

/// Result type alias for worker calls.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors raised by [`WorkerClient`](super::WorkerClient) calls.
///
/// Health and readiness probes never return these; they collapse failures into
/// a sentinel or `false` instead.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The per-call deadline elapsed before the response body was read.
    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The worker answered with a non-success status.
    #[error("{operation} failed: {status} {status_text}")]
    Status {
        operation: &'static str,
        status: u16,
        status_text: String,
    },

    /// Connection refused, DNS failure, reset, or similar.
    #[error("{operation} failed: worker unreachable: {source}")]
    Network {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not match the expected shape.
    #[error("{operation} returned an unexpected body: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl WorkerError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// HTTP status code, if the worker answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short category label used in log fields.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Status { .. } => "http",
            Self::Network { .. } | Self::Client(_) => "network",
            Self::Decode { .. } => "decode",
        }
    }
}
