//! Registry of active service sessions.
//!
//! [`SessionStorage`] tracks every session on the node, reconciles traffic
//! and earnings from accounting events delivered over the bus, and publishes
//! a [`SessionEvent`] for each creation, earnings update and removal.

pub mod config;
pub mod error;
pub mod event;
mod lifecycle;
pub mod session;
pub mod storage;

pub use config::StorageConfig;
pub use error::{Result, SessionError};
pub use event::{
    DataTransferredEvent, SessionEvent, SessionStatus, TokensEarnedEvent, TOPIC_DATA_TRANSFERRED,
    TOPIC_SESSION_LIFECYCLE, TOPIC_TOKENS_EARNED,
};
pub use session::{DataTransfer, Identity, Session, SessionId};
pub use storage::{FindOpts, SessionStorage};
