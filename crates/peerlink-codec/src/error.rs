/// Errors that can occur while packing, unpacking or routing messages.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The value could not be represented by the target encoding.
    #[error("failed to encode payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// The bytes could not be decoded into the payload slot.
    #[error("failed to decode payload: {0}")]
    Decode(#[source] serde_json::Error),

    /// The envelope header contains an invalid magic number.
    #[error("invalid envelope magic (expected 0x504C \"PL\")")]
    InvalidMagic,

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The topic name does not fit the envelope header.
    #[error("topic too long ({len} bytes, max {max})")]
    TopicTooLong { len: usize, max: usize },

    /// The topic bytes are not valid UTF-8.
    #[error("envelope topic is not valid UTF-8: {0}")]
    InvalidTopic(#[from] std::str::Utf8Error),

    /// No request handler is bound to the topic.
    #[error("no handler registered for topic {0:?}")]
    NoHandler(String),

    /// A request handler is already bound to the topic.
    #[error("handler already registered for topic {0:?}")]
    DuplicateHandler(String),
}

pub type Result<T> = std::result::Result<T, CodecError>;
