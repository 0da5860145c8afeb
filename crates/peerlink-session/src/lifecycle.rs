use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use peerlink_bus::Publisher;
use peerlink_codec::JsonPayload;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{Result, SessionError};
use crate::event::SessionEvent;

/// Fire-and-forget queue in front of the lifecycle publisher.
///
/// `push` never blocks; a dedicated worker thread drains the queue in FIFO
/// order and hands each event to the publisher. The worker exits once the
/// queue is dropped.
///
/// The channel is unbounded: if the publisher stalls, queued events (each a
/// full session snapshot) accumulate in memory without limit. The current
/// depth is logged as `queued` with every delivery.
pub(crate) struct LifecycleQueue {
    tx: mpsc::UnboundedSender<SessionEvent>,
    depth: Arc<AtomicUsize>,
}

impl LifecycleQueue {
    pub(crate) fn spawn(
        publisher: Arc<dyn Publisher>,
        topic: String,
        worker_name: &str,
    ) -> Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<SessionEvent>();
        let depth = Arc::new(AtomicUsize::new(0));
        let pending = Arc::clone(&depth);

        std::thread::Builder::new()
            .name(worker_name.to_string())
            .spawn(move || {
                while let Some(event) = rx.blocking_recv() {
                    let queued = pending.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
                    publish_event(publisher.as_ref(), &topic, &event, queued);
                }
                debug!(topic = %topic, "lifecycle queue closed");
            })
            .map_err(SessionError::Worker)?;

        Ok(Self { tx, depth })
    }

    pub(crate) fn push(&self, event: SessionEvent) {
        self.depth.fetch_add(1, Ordering::Relaxed);
        if let Err(err) = self.tx.send(event) {
            self.depth.fetch_sub(1, Ordering::Relaxed);
            let event = err.0;
            warn!(id = %event.id, status = ?event.status, "lifecycle worker gone, event dropped");
        }
    }

    /// Events pushed but not yet taken by the worker.
    pub(crate) fn depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }
}

fn publish_event(publisher: &dyn Publisher, topic: &str, event: &SessionEvent, queued: usize) {
    match publisher.publish(topic, &JsonPayload::new(event)) {
        Ok(receivers) => debug!(
            topic,
            id = %event.id,
            status = ?event.status,
            receivers,
            queued,
            "lifecycle event published"
        ),
        Err(err) => warn!(
            topic,
            id = %event.id,
            status = ?event.status,
            error = %err,
            queued,
            "failed publishing lifecycle event"
        ),
    }
}
