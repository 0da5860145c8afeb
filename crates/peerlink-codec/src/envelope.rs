use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{CodecError, Result};
use crate::packer::Packer;

/// Envelope header: magic (2) + topic length (2) + payload length (4) = 8 bytes.
pub const HEADER_SIZE: usize = 8;

/// Magic bytes: "PL" (0x50 0x4C).
pub const MAGIC: [u8; 2] = [0x50, 0x4C];

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Longest topic name the header can describe.
pub const MAX_TOPIC_LEN: usize = u16::MAX as usize;

/// A packed message tagged with the topic it should be routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub topic: String,
    pub payload: Bytes,
}

impl Envelope {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Pack `message` and tag it with `topic`.
    pub fn pack(topic: impl Into<String>, message: &dyn Packer) -> Result<Self> {
        Ok(Self::new(topic, message.pack()?))
    }

    /// The total wire size of this envelope (header + topic + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.topic.len() + self.payload.len()
    }

    /// Append the wire form of this envelope to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        encode_envelope(&self.topic, &self.payload, dst)
    }
}

/// Encode a topic-tagged payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────┬────────────┬─────────────┬─────────────┬──────────────┐
/// │ Magic (2B) │ Topic len  │ Payload len │ Topic       │ Payload      │
/// │ 0x50 0x4C  │ (2B LE)    │ (4B LE)     │ (UTF-8)     │ (raw bytes)  │
/// │ "PL"       │            │             │             │              │
/// └────────────┴────────────┴─────────────┴─────────────┴──────────────┘
/// ```
pub fn encode_envelope(topic: &str, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if topic.len() > MAX_TOPIC_LEN {
        return Err(CodecError::TopicTooLong {
            len: topic.len(),
            max: MAX_TOPIC_LEN,
        });
    }
    if payload.len() > u32::MAX as usize {
        return Err(CodecError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + topic.len() + payload.len());
    dst.put_slice(&MAGIC);
    dst.put_u16_le(topic.len() as u16);
    dst.put_u32_le(payload.len() as u32);
    dst.put_slice(topic.as_bytes());
    dst.put_slice(payload);
    Ok(())
}

/// Decode an envelope from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete envelope yet.
/// On success, consumes the envelope bytes from the buffer.
pub fn decode_envelope(src: &mut BytesMut, max_payload: usize) -> Result<Option<Envelope>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    if src[0..2] != MAGIC {
        return Err(CodecError::InvalidMagic);
    }

    let topic_len = u16::from_le_bytes([src[2], src[3]]) as usize;
    let payload_len = u32::from_le_bytes([src[4], src[5], src[6], src[7]]) as usize;

    if payload_len > max_payload {
        return Err(CodecError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + topic_len + payload_len;
    if src.len() < total {
        return Ok(None);
    }

    let topic = std::str::from_utf8(&src[HEADER_SIZE..HEADER_SIZE + topic_len])?.to_owned();

    src.advance(HEADER_SIZE + topic_len);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Envelope { topic, payload }))
}
