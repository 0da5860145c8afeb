//! Typed payloads across a byte-oriented boundary.
//!
//! Every message crossing the boundary goes through two capabilities:
//! - [`Packer`] turns a typed value into bytes
//! - [`Payload`] decodes bytes back into a reusable typed slot
//!
//! [`Listener`] and [`Handler`] bind a slot to a callback, and the
//! [`Dispatcher`] routes topic-tagged bytes to those bindings without
//! knowing their concrete payload types.

pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod json;
pub mod listener;
pub mod packer;
pub mod raw;

pub use dispatch::Dispatcher;
pub use envelope::{
    decode_envelope, encode_envelope, Envelope, DEFAULT_MAX_PAYLOAD, HEADER_SIZE, MAX_TOPIC_LEN,
};
pub use error::{CodecError, Result};
pub use handler::{Handler, RequestHandler};
pub use json::{json_handler, json_listener, JsonPayload};
pub use listener::{Listener, MessageListener};
pub use packer::{Packer, Payload};
pub use raw::{bytes_handler, bytes_listener, BytesPayload};
