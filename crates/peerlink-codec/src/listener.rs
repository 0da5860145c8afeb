use crate::error::Result;
use crate::packer::Payload;

/// Type-erased one-way consumer, as seen by the dispatch layer.
pub trait MessageListener: Send {
    /// Decode `data` and run the bound callback.
    ///
    /// The callback must not run when decoding fails.
    fn consume(&mut self, data: &[u8]) -> Result<()>;
}

/// Binds one payload slot to a fire-and-forget callback.
///
/// The slot is mutated in place by [`Payload::unpack`] and then read by
/// [`Listener::invoke`], so a binding must not be driven from two threads at
/// once.
pub struct Listener<P> {
    /// Slot that incoming bytes are decoded into.
    pub message: P,
    callback: Box<dyn FnMut(&P) + Send>,
}

impl<P> Listener<P> {
    pub fn new<F>(message: P, callback: F) -> Self
    where
        F: FnMut(&P) + Send + 'static,
    {
        Self {
            message,
            callback: Box::new(callback),
        }
    }

    /// Call the bound callback once with the current slot value.
    pub fn invoke(&mut self) {
        (self.callback)(&self.message);
    }
}

impl<P: Payload> Listener<P> {
    /// Unpack `data` into the slot, then invoke.
    pub fn deliver(&mut self, data: &[u8]) -> Result<()> {
        self.message.unpack(data)?;
        self.invoke();
        Ok(())
    }
}

impl<P: Payload + Send> MessageListener for Listener<P> {
    fn consume(&mut self, data: &[u8]) -> Result<()> {
        self.deliver(data)
    }
}

impl<P> std::fmt::Debug for Listener<P>
where
    P: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}
