/// Errors that can occur while wiring up session storage.
///
/// Registry lookups never fail; absence is reported through `Option`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Subscribing to the event bus failed.
    #[error("bus error: {0}")]
    Bus(#[from] peerlink_bus::BusError),

    /// The lifecycle publishing worker could not be started.
    #[error("failed to start lifecycle worker: {0}")]
    Worker(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
