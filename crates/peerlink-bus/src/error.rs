/// Errors that can occur while publishing or subscribing.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// The message could not be packed.
    #[error("codec error: {0}")]
    Codec(#[from] peerlink_codec::CodecError),

    /// The bus cannot accept the request.
    #[error("bus unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, BusError>;
