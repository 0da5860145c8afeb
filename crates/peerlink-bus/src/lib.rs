//! Topic publish/subscribe over packed payloads.
//!
//! The bus only moves bytes: publishers hand over a [`Packer`], subscribers
//! register a [`MessageListener`] that decodes into its own typed slot.
//!
//! [`Packer`]: peerlink_codec::Packer
//! [`MessageListener`]: peerlink_codec::MessageListener

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{BusError, Result};
pub use memory::InMemoryBus;
pub use traits::{Publisher, Subscriber};
