//! Bridges a coding agent's session and tool events to a memory worker over HTTP.
//!
//! Host events flow through the bridge, which resolves session identity, redacts
//! private spans, and calls the worker:
//!
//! ```text
//! host event → EventBridge → SessionMapper → PrivacyTagStripper → WorkerClient → worker
//! ```
//!
//! | Host event | Worker call | Effect on session state |
//! |------------|-------------|-------------------------|
//! | `session.created` | `POST /api/sessions/init` | map host id ⇄ worker id, seed prompt counter (unless skipped) |
//! | `message.part.updated` (completed tool call) | `POST /api/sessions/observations` | none |
//! | `session.updated` (archived) | `POST /sessions/{id}/complete` | unmap, drop prompt counter |
//!
//! Nothing is persisted; a restart starts with an empty mapping.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`privacy`]: Redaction of `<private>` and `<claude-mem-context>` spans
//! - [`session`]: Bidirectional session mapping and prompt counters
//! - [`worker`]: Typed HTTP client for the worker API
//! - [`bridge`]: Host event types, the bus seam, and the event handlers
//! - [`context`]: Memory context retrieval for prompt injection
//! - [`integration`]: Startup wiring and degraded-mode handling

pub mod bridge;
pub mod config;
pub mod context;
pub mod integration;
pub mod privacy;
pub mod project;
pub mod session;
pub mod worker;
