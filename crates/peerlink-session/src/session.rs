use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::{SessionEvent, SessionStatus};

/// Opaque session token, unique among tracked sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identity of a remote peer, compared by address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn address(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// Bytes moved during a session, from the provider's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTransfer {
    pub up: u64,
    pub down: u64,
}

/// One active service-usage relationship between a consumer and this node.
///
/// Sessions are values: storage hands out copies, never references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub consumer_id: Identity,
    pub service_id: String,
    pub service_type: String,
    pub data_transferred: DataTransfer,
    pub tokens_earned: u64,
    /// Set on lookup results when this is the only tracked session.
    #[serde(default)]
    pub last: bool,
}

impl Session {
    pub fn new(
        id: impl Into<SessionId>,
        consumer_id: Identity,
        service_id: impl Into<String>,
        service_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            consumer_id,
            service_id: service_id.into(),
            service_type: service_type.into(),
            ..Self::default()
        }
    }

    pub(crate) fn to_event(&self, status: SessionStatus) -> SessionEvent {
        SessionEvent {
            id: self.id.clone(),
            status,
            session: self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_strings() {
        let session = Session::new("s-1", Identity::new("0xabc"), "svc-1", "wireguard");
        let value = serde_json::to_value(&session).unwrap();

        assert_eq!(value["id"], "s-1");
        assert_eq!(value["consumer_id"], "0xabc");
        assert_eq!(value["data_transferred"]["up"], 0);
        assert_eq!(value["last"], false);
    }

    #[test]
    fn event_carries_snapshot() {
        let mut session = Session::new("s-2", Identity::new("0xdef"), "svc-2", "openvpn");
        session.tokens_earned = 10;

        let event = session.to_event(SessionStatus::Updated);
        assert_eq!(event.id, SessionId::from("s-2"));
        assert_eq!(event.status, SessionStatus::Updated);
        assert_eq!(event.session, session);
    }
}
