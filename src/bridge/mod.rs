//! Event-to-worker bridge.
//!
//! [`EventBridge`] turns host session and tool events into worker calls. Per host
//! session the implicit lifecycle is:
//!
//! ```text
//! UNMAPPED --session.created (not skipped)--> MAPPED --session.updated (archived)--> REMOVED
//! ```
//!
//! A session whose init response is `skipped` stays UNMAPPED for good, so none of
//! its tool events reach the worker. Worker failures are logged and swallowed;
//! they never propagate back into the host's dispatch path.

pub mod bus;
pub mod events;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info};

use crate::privacy::PrivacyTagStripper;
use crate::project::project_name;
use crate::session::{PromptTracker, SessionMapper};
use crate::worker::{Observation, WorkerClient};

pub use bus::{ChannelBus, EventBus};
pub use events::{EventEnvelope, HostEvent, MessagePart, SessionInfo, SessionTime};

#[derive(Debug, Default)]
struct SessionState {
    mapper: SessionMapper,
    prompts: PromptTracker,
    /// Host ids with a completion call in flight.
    completing: HashSet<String>,
}

/// How the bridge is wired to the host, decided once at attach time.
#[derive(Debug)]
pub enum Binding {
    /// A dispatch loop is consuming a bus subscription.
    Bound(JoinHandle<()>),
    /// No bus available; events arrive through direct [`EventBridge::handle_event`] calls.
    Standalone,
}

impl Binding {
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    /// Stop a running dispatch loop, cancelling its in-flight handlers.
    pub fn detach(self) {
        if let Self::Bound(handle) = self {
            handle.abort();
        }
    }

    /// Wait for the dispatch loop to end after its bus closes. The loop drains
    /// in-flight handlers before it returns.
    pub async fn join(self) {
        if let Self::Bound(handle) = self {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    error!(error = %e, "event dispatch loop panicked");
                }
            }
        }
    }
}

/// Orchestrates [`SessionMapper`], [`PrivacyTagStripper`] and [`WorkerClient`].
///
/// Cheap to clone; clones share the same session state.
#[derive(Debug, Clone)]
pub struct EventBridge {
    worker: Arc<WorkerClient>,
    state: Arc<Mutex<SessionState>>,
    stripper: PrivacyTagStripper,
    fallback_cwd: String,
}

impl EventBridge {
    pub fn new(worker: Arc<WorkerClient>) -> Self {
        let fallback_cwd = std::env::current_dir()
            .map(|dir| dir.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            worker,
            state: Arc::new(Mutex::new(SessionState::default())),
            stripper: PrivacyTagStripper::new(),
            fallback_cwd,
        }
    }

    /// Working directory reported for tool parts that carry none.
    pub fn with_fallback_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.fallback_cwd = cwd.into();
        self
    }

    /// Subscribe to `bus` if there is one, otherwise run standalone.
    ///
    /// The dispatch loop does not wait for a handler's network call before taking
    /// the next event; each event is handled on its own task, so completions may
    /// arrive in any order.
    pub fn attach(&self, bus: Option<&dyn EventBus>) -> Binding {
        let Some(bus) = bus else {
            info!("host event bus not available, running standalone");
            return Binding::Standalone;
        };

        let mut events = bus.subscribe();
        let bridge = self.clone();
        let handle = tokio::spawn(async move {
            let mut in_flight = JoinSet::new();
            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Some(event) => {
                            let bridge = bridge.clone();
                            in_flight.spawn(async move { bridge.handle_event(event).await });
                        }
                        None => break,
                    },
                    Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
                }
            }
            debug!(in_flight = in_flight.len(), "host event stream closed, draining handlers");
            while in_flight.join_next().await.is_some() {}
        });

        info!("subscribed to host session and tool events");
        Binding::Bound(handle)
    }

    pub async fn handle_event(&self, event: HostEvent) {
        match event {
            HostEvent::SessionCreated(info) => self.handle_session_created(&info).await,
            HostEvent::PartUpdated(part) => self.handle_part_updated(&part).await,
            HostEvent::SessionUpdated(info) => self.handle_session_updated(&info).await,
        }
    }

    /// Initialize a worker session and, unless it was skipped, map it.
    pub async fn handle_session_created(&self, info: &SessionInfo) {
        let project = project_name(&info.directory);
        let session_id = info.id.as_str();
        info!(session_id, project = %project, "session created");

        let response = match self
            .worker
            .init_session(session_id, &project, info.title_or_default())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(
                    session_id,
                    kind = e.category(),
                    error = %e,
                    "failed to initialize worker session"
                );
                return;
            }
        };

        if response.skipped {
            let mut state = self.state();
            state.mapper.unmap(session_id);
            state.prompts.remove(session_id);
            info!(
                session_id,
                reason = response.reason.as_deref().unwrap_or("unspecified"),
                "session opted out of capture"
            );
            return;
        }

        {
            let mut state = self.state();
            state.mapper.map(session_id, response.session_db_id);
            state.prompts.seed(session_id, response.prompt_number);
        }
        info!(
            session_id,
            remote_id = response.session_db_id,
            prompt_number = response.prompt_number,
            project = %project,
            "session mapped"
        );
    }

    /// Submit a sanitized observation for a completed tool call on a mapped session.
    pub async fn handle_part_updated(&self, part: &MessagePart) {
        if !part.is_completed_tool_call() {
            return;
        }

        let session_id = part.session_id.as_str();
        let resolved = {
            let state = self.state();
            let remote_id = state.mapper.resolve(session_id);
            remote_id.map(|remote_id| (remote_id, state.prompts.current(session_id)))
        };
        let Some((remote_id, prompt_number)) = resolved else {
            debug!(session_id, tool = %part.name, "no worker session, dropping tool event");
            return;
        };

        let observation = Observation {
            session_db_id: remote_id,
            prompt_number,
            tool_name: part.name.clone(),
            tool_input: self.stripper.strip_from_json(&part.args),
            tool_output: self
                .stripper
                .strip_from_text(part.result.as_deref().unwrap_or_default()),
            cwd: part
                .cwd
                .clone()
                .unwrap_or_else(|| self.fallback_cwd.clone()),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };

        match self.worker.add_observation(&observation).await {
            Ok(()) => info!(session_id, remote_id, tool = %part.name, "observation added"),
            Err(e) => error!(
                session_id,
                remote_id,
                tool = %part.name,
                kind = e.category(),
                error = %e,
                "failed to add observation"
            ),
        }
    }

    /// Complete the worker session when the host archives it, then forget it.
    ///
    /// Only one completion per host session is in flight at a time; archival
    /// events that arrive meanwhile are dropped. The mapping survives a failed
    /// completion so a later archival event can retry.
    pub async fn handle_session_updated(&self, info: &SessionInfo) {
        if !info.is_archived() {
            return;
        }

        let session_id = info.id.as_str();
        let remote_id = {
            let mut state = self.state();
            let Some(remote_id) = state.mapper.resolve(session_id) else {
                debug!(session_id, "no worker session, ignoring archival");
                return;
            };
            if !state.completing.insert(session_id.to_string()) {
                debug!(session_id, remote_id, "completion already in flight, ignoring archival");
                return;
            }
            remote_id
        };

        info!(session_id, remote_id, "session archived");
        let result = self.worker.complete_session(remote_id).await;

        let mut state = self.state();
        state.completing.remove(session_id);
        match result {
            Ok(()) => {
                state.mapper.unmap(session_id);
                state.prompts.remove(session_id);
                info!(session_id, remote_id, "session completed");
            }
            Err(e) => error!(
                session_id,
                remote_id,
                kind = e.category(),
                error = %e,
                "failed to complete worker session"
            ),
        }
    }

    pub fn remote_session_id(&self, host_id: &str) -> Option<i64> {
        self.state().mapper.resolve(host_id)
    }

    pub fn host_session_id(&self, remote_id: i64) -> Option<String> {
        self.state().mapper.resolve_reverse(remote_id).map(str::to_string)
    }

    pub fn mapped_sessions(&self) -> HashMap<String, i64> {
        self.state().mapper.all()
    }

    pub fn prompt_number(&self, host_id: &str) -> u32 {
        self.state().prompts.current(host_id)
    }

    /// Advance a session's prompt counter. No event path calls this; callers
    /// that track user prompts may.
    pub fn increment_prompt_number(&self, host_id: &str) -> u32 {
        self.state().prompts.increment(host_id)
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
