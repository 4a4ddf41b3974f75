//! Host event payloads.
//!
//! The host publishes JSON envelopes of the form
//! `{"type": "<event name>", "properties": {...}}`. Only the three event kinds
//! below are bridged; everything else is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_UPDATED: &str = "session.updated";
pub const PART_UPDATED: &str = "message.part.updated";

/// Part type the host uses for tool invocations.
pub const TOOL_CALL_PART: &str = "tool_call";

/// Title sent to the worker when the host session has none.
pub const DEFAULT_SESSION_TITLE: &str = "New session";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<i64>,
}

/// Host-side session description carried by session events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    #[serde(default)]
    pub directory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub time: SessionTime,
}

impl SessionInfo {
    pub fn is_archived(&self) -> bool {
        self.time.archived.is_some()
    }

    pub fn title_or_default(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => DEFAULT_SESSION_TITLE,
        }
    }
}

/// One updated message part. Only tool-call parts are of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "sessionID")]
    pub session_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Execution state, when the host reports one (`pending`, `running`, `completed`, `error`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl MessagePart {
    /// A tool-call part whose status is absent or `completed`.
    pub fn is_completed_tool_call(&self) -> bool {
        self.kind == TOOL_CALL_PART
            && self
                .status
                .as_deref()
                .map_or(true, |status| status == "completed")
    }
}

/// The three host events the bridge reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    SessionCreated(SessionInfo),
    PartUpdated(MessagePart),
    SessionUpdated(SessionInfo),
}

impl HostEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionCreated(_) => SESSION_CREATED,
            Self::PartUpdated(_) => PART_UPDATED,
            Self::SessionUpdated(_) => SESSION_UPDATED,
        }
    }
}

/// Raw `{type, properties}` envelope as published by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: Value,
}

#[derive(Deserialize)]
struct InfoProperties {
    info: SessionInfo,
}

#[derive(Deserialize)]
struct PartProperties {
    part: MessagePart,
}

impl EventEnvelope {
    /// Decode into a [`HostEvent`]. `Ok(None)` for event kinds the bridge does not handle.
    pub fn into_event(self) -> Result<Option<HostEvent>, serde_json::Error> {
        let event = match self.kind.as_str() {
            SESSION_CREATED => {
                let props: InfoProperties = serde_json::from_value(self.properties)?;
                HostEvent::SessionCreated(props.info)
            }
            SESSION_UPDATED => {
                let props: InfoProperties = serde_json::from_value(self.properties)?;
                HostEvent::SessionUpdated(props.info)
            }
            PART_UPDATED => {
                let props: PartProperties = serde_json::from_value(self.properties)?;
                HostEvent::PartUpdated(props.part)
            }
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    /// Parse one line of newline-delimited JSON.
    pub fn parse_line(line: &str) -> Result<Option<HostEvent>, serde_json::Error> {
        let envelope: EventEnvelope = serde_json::from_str(line)?;
        envelope.into_event()
    }
}
