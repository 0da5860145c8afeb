use bytes::Bytes;

use crate::error::Result;
use crate::handler::Handler;
use crate::listener::Listener;
use crate::packer::{Packer, Payload};

/// Passthrough payload: packs and unpacks bytes verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BytesPayload {
    pub data: Bytes,
}

impl BytesPayload {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl Packer for BytesPayload {
    fn pack(&self) -> Result<Bytes> {
        Ok(self.data.clone())
    }
}

impl Payload for BytesPayload {
    fn unpack(&mut self, data: &[u8]) -> Result<()> {
        self.data = Bytes::copy_from_slice(data);
        Ok(())
    }
}

/// Bind a callback to a fresh raw payload slot.
pub fn bytes_listener<F>(callback: F) -> Listener<BytesPayload>
where
    F: FnMut(&BytesPayload) + Send + 'static,
{
    Listener::new(BytesPayload::default(), callback)
}

/// Bind a request callback to a fresh raw request slot.
pub fn bytes_handler<F>(callback: F) -> Handler<BytesPayload, BytesPayload>
where
    F: FnMut(&BytesPayload) -> BytesPayload + Send + 'static,
{
    Handler::new(BytesPayload::default(), callback)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn pack_returns_content_unchanged() {
        let packer = BytesPayload::new(&b"123"[..]);
        let data = packer.pack().unwrap();
        assert_eq!(data.as_ref(), b"123");
    }

    #[test]
    fn unpack_stores_bytes_verbatim() {
        let mut slot = BytesPayload::default();
        slot.unpack(b"123").unwrap();
        assert_eq!(slot.data.as_ref(), b"123");

        slot.unpack(b"").unwrap();
        assert!(slot.data.is_empty());
    }

    #[test]
    fn roundtrip_through_pack_and_unpack() {
        let samples: [&'static [u8]; 3] = [b"", b"plain text", &[0x00, 0xFF, 0xC3, 0x28, 0x80]];
        for sample in samples {
            let original = BytesPayload::new(sample);
            let packed = original.pack().unwrap();

            let mut slot = BytesPayload::new(&b"stale"[..]);
            slot.unpack(&packed).unwrap();
            assert_eq!(slot, original);
        }
    }

    #[test]
    fn listener_sees_unpacked_message() {
        let consumed = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&consumed);
        let mut listener = bytes_listener(move |message| {
            *sink.lock().unwrap() = Some(message.clone());
        });

        listener.message.unpack(b"123").unwrap();
        listener.invoke();

        assert_eq!(
            consumed.lock().unwrap().clone(),
            Some(BytesPayload::new(&b"123"[..]))
        );
    }

    #[test]
    fn handler_returns_callback_response() {
        let received = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&received);
        let mut handler = bytes_handler(move |request| {
            *sink.lock().unwrap() = Some(request.clone());
            BytesPayload::new(&b"RESPONSE"[..])
        });

        handler.request.unpack(b"REQUEST").unwrap();
        let response = handler.invoke();

        assert_eq!(
            received.lock().unwrap().clone(),
            Some(BytesPayload::new(&b"REQUEST"[..]))
        );
        assert_eq!(response, BytesPayload::new(&b"RESPONSE"[..]));
        assert_eq!(response.pack().unwrap().as_ref(), b"RESPONSE");
    }
}
