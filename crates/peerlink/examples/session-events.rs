//! Session events example: wires storage to an in-memory bus and feeds it
//! accounting events.
//!
//! Run with:
//!   PEERLINK_LOG=debug cargo run --example session-events --features logging

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use peerlink::bus::{InMemoryBus, Publisher, Subscriber};
use peerlink::codec::{json_listener, JsonPayload};
use peerlink::logging::{init_logging, LogFormat, LogLevel};
use peerlink::session::{
    DataTransferredEvent, Identity, Session, SessionEvent, SessionId, SessionStorage,
    TokensEarnedEvent, TOPIC_DATA_TRANSFERRED, TOPIC_SESSION_LIFECYCLE, TOPIC_TOKENS_EARNED,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let level = std::env::var("PEERLINK_LOG")
        .ok()
        .map(|value| value.parse::<LogLevel>())
        .transpose()?
        .unwrap_or_default();
    let format = std::env::var("PEERLINK_LOG_FORMAT")
        .ok()
        .map(|value| value.parse::<LogFormat>())
        .transpose()?
        .unwrap_or_default();
    init_logging(format, level);

    let bus = Arc::new(InMemoryBus::new());
    let (tx, rx) = mpsc::channel();
    bus.subscribe(
        TOPIC_SESSION_LIFECYCLE,
        Box::new(json_listener(move |event: &SessionEvent| {
            let _ = tx.send(event.clone());
        })),
    )?;

    let storage = Arc::new(SessionStorage::new(bus.clone())?);
    storage.subscribe(bus.as_ref())?;

    let id = SessionId::from("example-session");
    storage.add(Session::new(
        id.clone(),
        Identity::new("0x5a3c"),
        "service-1",
        "wireguard",
    ));

    bus.publish(
        TOPIC_DATA_TRANSFERRED,
        &JsonPayload::new(DataTransferredEvent {
            id: id.clone(),
            up: 4096,
            down: 1024,
        }),
    )?;
    bus.publish(
        TOPIC_TOKENS_EARNED,
        &JsonPayload::new(TokensEarnedEvent {
            session_id: id.clone(),
            total: 250,
        }),
    )?;
    storage.remove(&id);

    while let Ok(event) = rx.recv_timeout(Duration::from_millis(500)) {
        eprintln!(
            "[lifecycle] {:?} {} tokens={} up={} down={}",
            event.status,
            event.id,
            event.session.tokens_earned,
            event.session.data_transferred.up,
            event.session.data_transferred.down
        );
    }

    Ok(())
}
