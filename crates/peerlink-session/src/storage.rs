use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use peerlink_bus::{Publisher, Subscriber};
use peerlink_codec::json_listener;
use tracing::debug;

use crate::config::StorageConfig;
use crate::error::Result;
use crate::event::{DataTransferredEvent, SessionStatus, TokensEarnedEvent};
use crate::lifecycle::LifecycleQueue;
use crate::session::{Identity, Session, SessionId};

/// Optional constraints for [`SessionStorage::find_by`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOpts {
    pub peer: Option<Identity>,
    pub service_type: Option<String>,
}

impl FindOpts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only match sessions consumed by `peer`.
    pub fn peer(mut self, peer: Identity) -> Self {
        self.peer = Some(peer);
        self
    }

    /// Only match sessions of `service_type`.
    pub fn service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = Some(service_type.into());
        self
    }

    fn matches(&self, session: &Session) -> bool {
        if let Some(peer) = &self.peer {
            if *peer != session.consumer_id {
                return false;
            }
        }
        if let Some(service_type) = &self.service_type {
            if *service_type != session.service_type {
                return false;
            }
        }
        true
    }
}

/// In-memory registry of every active session on this node.
///
/// A single lock guards the whole map and is held only for the map access
/// itself. Created, Updated and Removed events are queued while the lock is
/// held, so each session's events follow its mutation order, and delivered
/// by a background worker the caller never waits for.
pub struct SessionStorage {
    sessions: Mutex<HashMap<SessionId, Session>>,
    lifecycle: LifecycleQueue,
    config: StorageConfig,
}

impl SessionStorage {
    /// Create storage publishing lifecycle events with default topics.
    pub fn new(publisher: Arc<dyn Publisher>) -> Result<Self> {
        Self::with_config(publisher, StorageConfig::default())
    }

    /// Create storage with explicit config.
    pub fn with_config(publisher: Arc<dyn Publisher>, config: StorageConfig) -> Result<Self> {
        let lifecycle = LifecycleQueue::spawn(
            publisher,
            config.lifecycle_topic.clone(),
            &config.worker_name,
        )?;
        Ok(Self {
            sessions: Mutex::new(HashMap::new()),
            lifecycle,
            config,
        })
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track `session`, replacing any session with the same id.
    ///
    /// Several sessions per peer are allowed when different services are used.
    pub fn add(&self, mut session: Session) {
        session.last = false;

        let mut sessions = self.sessions();
        debug!(id = %session.id, service_id = %session.service_id, "session added");
        self.lifecycle.push(session.to_event(SessionStatus::Created));
        sessions.insert(session.id.clone(), session);
    }

    /// Snapshot of every tracked session, in no particular order.
    pub fn get_all(&self) -> Vec<Session> {
        self.sessions().values().cloned().collect()
    }

    /// Look up a session by id.
    ///
    /// The returned copy has `last` set when it is the only tracked session.
    pub fn find(&self, id: &SessionId) -> Option<Session> {
        let sessions = self.sessions();
        let mut instance = sessions.get(id)?.clone();
        instance.last = sessions.len() == 1;
        Some(instance)
    }

    /// First session matching every constraint in `opts`.
    ///
    /// Iteration order is unspecified: when several sessions match, any one
    /// of them may be returned.
    pub fn find_by(&self, opts: &FindOpts) -> Option<Session> {
        self.sessions()
            .values()
            .find(|session| opts.matches(session))
            .cloned()
    }

    /// Stop tracking the session with `id`. No-op if it is unknown.
    pub fn remove(&self, id: &SessionId) {
        let mut sessions = self.sessions();
        if let Some(instance) = sessions.remove(id) {
            debug!(%id, "session removed");
            self.lifecycle.push(instance.to_event(SessionStatus::Removed));
        }
    }

    /// Remove every session belonging to `service_id`.
    ///
    /// Works on a snapshot and removes sessions one at a time, so sessions
    /// added for the service while this runs may survive.
    pub fn remove_for_service(&self, service_id: &str) {
        for session in self.get_all() {
            if session.service_id == service_id {
                self.remove(&session.id);
            }
        }
    }

    /// Record traffic totals for a tracked session.
    ///
    /// The emitter's `up` becomes the session's `down` and vice versa.
    /// Publishes nothing; unknown ids are ignored.
    pub fn consume_data_transferred_event(&self, event: &DataTransferredEvent) {
        let mut sessions = self.sessions();
        match sessions.get_mut(&event.id) {
            Some(instance) => {
                instance.data_transferred.down = event.up;
                instance.data_transferred.up = event.down;
            }
            None => debug!(id = %event.id, "data transfer for unknown session dropped"),
        }
    }

    /// Replace the earnings total of a tracked session and publish an
    /// Updated event. Unknown ids are ignored.
    ///
    /// The reported total is authoritative, even when lower than the tracked
    /// one; keeping totals monotonic is up to the emitter.
    pub fn consume_tokens_earned_event(&self, event: &TokensEarnedEvent) {
        let mut sessions = self.sessions();
        match sessions.get_mut(&event.session_id) {
            Some(instance) => {
                instance.tokens_earned = event.total;
                self.lifecycle
                    .push(instance.to_event(SessionStatus::Updated));
            }
            None => debug!(id = %event.session_id, "tokens earned for unknown session dropped"),
        }
    }

    /// Subscribe to the accounting topics on `bus`.
    ///
    /// The listeners hold a weak reference, so they become no-ops once the
    /// storage is dropped.
    pub fn subscribe(self: &Arc<Self>, bus: &dyn Subscriber) -> Result<()> {
        let storage = Arc::downgrade(self);
        bus.subscribe(
            &self.config.data_transferred_topic,
            Box::new(json_listener(move |event: &DataTransferredEvent| {
                if let Some(storage) = storage.upgrade() {
                    storage.consume_data_transferred_event(event);
                }
            })),
        )?;

        let storage = Arc::downgrade(self);
        bus.subscribe(
            &self.config.tokens_earned_topic,
            Box::new(json_listener(move |event: &TokensEarnedEvent| {
                if let Some(storage) = storage.upgrade() {
                    storage.consume_tokens_earned_event(event);
                }
            })),
        )?;

        Ok(())
    }

    /// Number of tracked sessions.
    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    /// Lifecycle events queued but not yet handed to the publisher.
    pub fn pending_lifecycle_events(&self) -> usize {
        self.lifecycle.depth()
    }

    /// Get storage configuration.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl std::fmt::Debug for SessionStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStorage")
            .field("sessions", &self.len())
            .field("config", &self.config)
            .finish()
    }
}
