use crate::event::{TOPIC_DATA_TRANSFERRED, TOPIC_SESSION_LIFECYCLE, TOPIC_TOKENS_EARNED};

/// Controls which topics session storage talks on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Topic lifecycle events are published on.
    pub lifecycle_topic: String,
    /// Topic carrying [`DataTransferredEvent`](crate::DataTransferredEvent)s.
    pub data_transferred_topic: String,
    /// Topic carrying [`TokensEarnedEvent`](crate::TokensEarnedEvent)s.
    pub tokens_earned_topic: String,
    /// Thread name of the lifecycle publishing worker.
    pub worker_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            lifecycle_topic: TOPIC_SESSION_LIFECYCLE.to_string(),
            data_transferred_topic: TOPIC_DATA_TRANSFERRED.to_string(),
            tokens_earned_topic: TOPIC_TOKENS_EARNED.to_string(),
            worker_name: "session-lifecycle".to_string(),
        }
    }
}
