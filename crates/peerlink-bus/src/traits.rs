use peerlink_codec::{MessageListener, Packer};

use crate::error::Result;

/// Publishing side of the bus.
pub trait Publisher: Send + Sync {
    /// Pack `message` and hand it to every subscriber of `topic`.
    ///
    /// Returns the number of subscribers that accepted the message.
    fn publish(&self, topic: &str, message: &dyn Packer) -> Result<usize>;
}

/// Subscribing side of the bus.
pub trait Subscriber: Send + Sync {
    /// Register `listener` for every message published on `topic`.
    fn subscribe(&self, topic: &str, listener: Box<dyn MessageListener>) -> Result<()>;
}
