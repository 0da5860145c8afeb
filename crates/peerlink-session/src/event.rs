use serde::{Deserialize, Serialize};

use crate::session::{Session, SessionId};

/// Default topic for session lifecycle events.
pub const TOPIC_SESSION_LIFECYCLE: &str = "session-lifecycle";
/// Default topic for traffic accounting updates.
pub const TOPIC_DATA_TRANSFERRED: &str = "session-data-transferred";
/// Default topic for earnings updates.
pub const TOPIC_TOKENS_EARNED: &str = "session-tokens-earned";

/// What happened to a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Created,
    Updated,
    Removed,
}

/// Published whenever a tracked session is created, updated or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub id: SessionId,
    pub status: SessionStatus,
    pub session: Session,
}

/// Traffic totals reported by the side that emits them.
///
/// `up` is what the emitter sent, so storage records it as the session's
/// `down`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataTransferredEvent {
    pub id: SessionId,
    pub up: u64,
    pub down: u64,
}

/// Running total earned during a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokensEarnedEvent {
    pub session_id: SessionId,
    pub total: u64,
}
