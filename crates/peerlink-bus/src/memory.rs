use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, TryLockError};

use peerlink_codec::{MessageListener, Packer};
use tracing::{debug, warn};

use crate::error::Result;
use crate::traits::{Publisher, Subscriber};

type SharedListener = Arc<Mutex<Box<dyn MessageListener>>>;

thread_local! {
    static ACTIVE: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

/// Marks a listener as running on the current thread until dropped.
struct ActiveDelivery(usize);

impl ActiveDelivery {
    /// `None` when the listener is already running further up this thread's stack.
    fn enter(listener: &SharedListener) -> Option<Self> {
        let key = Arc::as_ptr(listener) as *const () as usize;
        ACTIVE
            .with(|active| active.borrow_mut().insert(key))
            .then(|| Self(key))
    }
}

impl Drop for ActiveDelivery {
    fn drop(&mut self) {
        ACTIVE.with(|active| active.borrow_mut().remove(&self.0));
    }
}

/// In-process bus delivering every publication synchronously.
///
/// Listeners run on the publisher's thread. The subscription table is not
/// locked while listeners run, so a listener may publish or subscribe.
///
/// A listener that publishes to its own topic does not receive its own
/// publication: the nested delivery to it is skipped with a `warn!` and not
/// counted as a receiver. Publications from other threads wait for a busy
/// listener instead of skipping it.
#[derive(Default)]
pub struct InMemoryBus {
    topics: RwLock<HashMap<String, Vec<SharedListener>>>,
    published: AtomicU64,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of listeners subscribed to `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map_or(0, Vec::len)
    }

    /// Total number of publish calls that packed successfully.
    pub fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Publisher for InMemoryBus {
    fn publish(&self, topic: &str, message: &dyn Packer) -> Result<usize> {
        let data = message.pack()?;
        self.published.fetch_add(1, Ordering::Relaxed);

        let listeners = self
            .topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .cloned()
            .unwrap_or_default();

        let mut receivers = 0usize;
        for listener in &listeners {
            let Some(_active) = ActiveDelivery::enter(listener) else {
                warn!(topic, "listener busy on this thread, skipping re-entrant delivery");
                continue;
            };
            let mut listener = match listener.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => {
                    listener.lock().unwrap_or_else(PoisonError::into_inner)
                }
            };
            match listener.consume(&data) {
                Ok(()) => receivers += 1,
                Err(err) => warn!(topic, error = %err, "subscriber rejected message"),
            }
        }

        debug!(topic, receivers, size = data.len(), "message published");
        Ok(receivers)
    }
}

impl Subscriber for InMemoryBus {
    fn subscribe(&self, topic: &str, listener: Box<dyn MessageListener>) -> Result<()> {
        self.topics
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic.to_string())
            .or_default()
            .push(Arc::new(Mutex::new(listener)));
        debug!(topic, "subscription created");
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<&String> = topics.keys().collect();
        names.sort_unstable();
        f.debug_struct("InMemoryBus")
            .field("topics", &names)
            .field("published", &self.events_published())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use peerlink_codec::{bytes_listener, json_listener, BytesPayload, CodecError, JsonPayload};
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::error::BusError;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Tick {
        n: u32,
    }

    struct Broken;

    impl Packer for Broken {
        fn pack(&self) -> peerlink_codec::Result<bytes::Bytes> {
            Err(CodecError::NoHandler("broken".to_string()))
        }
    }

    #[test]
    fn publish_without_subscribers() {
        let bus = InMemoryBus::new();
        let receivers = bus.publish("ticks", &JsonPayload::new(Tick { n: 1 })).unwrap();
        assert_eq!(receivers, 0);
        assert_eq!(bus.events_published(), 1);
    }

    #[test]
    fn publish_reaches_topic_subscribers_only() {
        let bus = InMemoryBus::new();
        let (tx, rx) = mpsc::channel();
        let ticks = tx.clone();
        bus.subscribe(
            "ticks",
            Box::new(json_listener(move |tick: &Tick| {
                let _ = ticks.send(("ticks", tick.n));
            })),
        )
        .unwrap();
        bus.subscribe(
            "other",
            Box::new(json_listener(move |tick: &Tick| {
                let _ = tx.send(("other", tick.n));
            })),
        )
        .unwrap();

        assert_eq!(
            bus.publish("ticks", &JsonPayload::new(Tick { n: 7 })).unwrap(),
            1
        );
        assert_eq!(rx.try_recv().unwrap(), ("ticks", 7));
        assert!(rx.try_recv().is_err());
        assert_eq!(bus.subscriber_count("ticks"), 1);
        assert_eq!(bus.subscriber_count("missing"), 0);
    }

    #[test]
    fn rejected_delivery_does_not_fail_publish() {
        let bus = InMemoryBus::new();
        let (tx, rx) = mpsc::channel();
        bus.subscribe("mixed", Box::new(json_listener(|_: &Tick| {})))
            .unwrap();
        bus.subscribe(
            "mixed",
            Box::new(bytes_listener(move |payload: &BytesPayload| {
                let _ = tx.send(payload.data.clone());
            })),
        )
        .unwrap();

        let receivers = bus
            .publish("mixed", &BytesPayload::new(&b"not json"[..]))
            .unwrap();
        assert_eq!(receivers, 1);
        assert_eq!(rx.try_recv().unwrap().as_ref(), b"not json");
    }

    #[test]
    fn pack_failure_is_returned() {
        let bus = InMemoryBus::new();
        assert!(matches!(
            bus.publish("ticks", &Broken),
            Err(BusError::Codec(_))
        ));
        assert_eq!(bus.events_published(), 0);
    }

    #[test]
    fn listener_may_publish_reentrantly() {
        let bus = Arc::new(InMemoryBus::new());
        let (tx, rx) = mpsc::channel();

        let forward = Arc::clone(&bus);
        bus.subscribe(
            "first",
            Box::new(json_listener(move |tick: &Tick| {
                let _ = forward.publish("second", &JsonPayload::new(Tick { n: tick.n + 1 }));
            })),
        )
        .unwrap();
        bus.subscribe(
            "second",
            Box::new(json_listener(move |tick: &Tick| {
                let _ = tx.send(tick.n);
            })),
        )
        .unwrap();

        bus.publish("first", &JsonPayload::new(Tick { n: 1 })).unwrap();
        assert_eq!(rx.try_recv().unwrap(), 2);
    }

    #[test]
    fn listener_republishing_to_own_topic_is_skipped() {
        let bus = Arc::new(InMemoryBus::new());
        let (tx, rx) = mpsc::channel();

        let echo = Arc::clone(&bus);
        bus.subscribe(
            "echo",
            Box::new(json_listener(move |tick: &Tick| {
                let nested = if tick.n == 0 {
                    echo.publish("echo", &JsonPayload::new(Tick { n: tick.n + 1 }))
                        .ok()
                } else {
                    None
                };
                let _ = tx.send((tick.n, nested));
            })),
        )
        .unwrap();

        let receivers = bus.publish("echo", &JsonPayload::new(Tick { n: 0 })).unwrap();
        assert_eq!(receivers, 1);
        assert_eq!(rx.try_recv().unwrap(), (0, Some(0)));
        assert!(rx.try_recv().is_err());
        assert_eq!(bus.events_published(), 2);

        // The skip is scoped to the nested call; later publications still arrive.
        bus.publish("echo", &JsonPayload::new(Tick { n: 5 })).unwrap();
        assert_eq!(rx.try_recv().unwrap(), (5, None));
    }

    #[test]
    fn concurrent_publishers_wait_for_busy_listener() {
        let bus = Arc::new(InMemoryBus::new());
        let (tx, rx) = mpsc::channel();
        bus.subscribe(
            "ticks",
            Box::new(json_listener(move |tick: &Tick| {
                std::thread::sleep(std::time::Duration::from_millis(2));
                let _ = tx.send(tick.n);
            })),
        )
        .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let bus = Arc::clone(&bus);
                std::thread::spawn(move || bus.publish("ticks", &JsonPayload::new(Tick { n })))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 1);
        }

        let mut seen: Vec<u32> = rx.try_iter().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..8).collect::<Vec<_>>());
    }
}
