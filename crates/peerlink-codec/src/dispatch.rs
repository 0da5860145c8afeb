use std::collections::HashMap;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::envelope::Envelope;
use crate::error::{CodecError, Result};
use crate::handler::RequestHandler;
use crate::listener::MessageListener;

/// Routes topic-tagged bytes to the bindings registered for that topic.
///
/// A topic may carry any number of listeners but at most one handler.
/// Routing is synchronous: callbacks run on the caller's thread.
#[derive(Default)]
pub struct Dispatcher {
    listeners: HashMap<String, Vec<Box<dyn MessageListener>>>,
    handlers: HashMap<String, Box<dyn RequestHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a one-way listener for `topic`.
    pub fn add_listener<L>(&mut self, topic: impl Into<String>, listener: L)
    where
        L: MessageListener + 'static,
    {
        self.listeners
            .entry(topic.into())
            .or_default()
            .push(Box::new(listener));
    }

    /// Bind the request handler for `topic`.
    pub fn add_handler<H>(&mut self, topic: impl Into<String>, handler: H) -> Result<()>
    where
        H: RequestHandler + 'static,
    {
        let topic = topic.into();
        if self.handlers.contains_key(&topic) {
            return Err(CodecError::DuplicateHandler(topic));
        }
        self.handlers.insert(topic, Box::new(handler));
        Ok(())
    }

    /// Deliver `data` to every listener of `topic`.
    ///
    /// Every listener is attempted even if an earlier one fails to decode;
    /// the first decode error is returned. Returns the number of listeners
    /// whose callback ran.
    pub fn deliver(&mut self, topic: &str, data: &[u8]) -> Result<usize> {
        let Some(listeners) = self.listeners.get_mut(topic) else {
            debug!(topic, "no listeners for topic");
            return Ok(0);
        };

        let mut delivered = 0usize;
        let mut first_error = None;
        for listener in listeners.iter_mut() {
            match listener.consume(data) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    warn!(topic, error = %err, "listener rejected message");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(delivered),
        }
    }

    /// Run the handler bound to `topic` and return its packed response.
    pub fn handle(&mut self, topic: &str, data: &[u8]) -> Result<Bytes> {
        let handler = self
            .handlers
            .get_mut(topic)
            .ok_or_else(|| CodecError::NoHandler(topic.to_string()))?;
        handler.handle(data)
    }

    /// Deliver an envelope to the listeners of its topic.
    pub fn dispatch(&mut self, envelope: &Envelope) -> Result<usize> {
        self.deliver(&envelope.topic, &envelope.payload)
    }

    /// Check if a handler is bound to `topic`.
    pub fn has_handler(&self, topic: &str) -> bool {
        self.handlers.contains_key(topic)
    }

    /// Number of listeners registered for `topic`.
    pub fn listener_count(&self, topic: &str) -> usize {
        self.listeners.get(topic).map_or(0, Vec::len)
    }

    /// Topics that have at least one binding.
    pub fn topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = self
            .listeners
            .keys()
            .chain(self.handlers.keys())
            .map(String::as_str)
            .collect();
        topics.sort_unstable();
        topics.dedup();
        topics
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("topics", &self.topics())
            .finish()
    }
}
