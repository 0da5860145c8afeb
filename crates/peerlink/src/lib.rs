//! Typed peer messaging and session tracking for network-access nodes.
//!
//! # Crate Structure
//!
//! - [`codec`]: Packer/Payload capabilities, listener and handler bindings, topic dispatch
//! - [`bus`]: Topic publish/subscribe over packed payloads
//! - [`session`]: Session registry with lifecycle events (behind `session` feature)
//! - [`logging`]: `tracing` subscriber setup (behind `logging` feature)

/// Re-export codec types.
pub mod codec {
    pub use peerlink_codec::*;
}

/// Re-export bus types.
pub mod bus {
    pub use peerlink_bus::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use peerlink_session::*;
}

#[cfg(feature = "logging")]
pub mod logging;
