use bytes::Bytes;

use crate::error::Result;
use crate::packer::{Packer, Payload};

/// Type-erased request/response binding, as seen by the dispatch layer.
pub trait RequestHandler: Send {
    /// Decode `data`, run the bound callback and pack its response.
    ///
    /// The callback must not run when decoding fails.
    fn handle(&mut self, data: &[u8]) -> Result<Bytes>;
}

/// Binds one request slot to a request -> response callback.
///
/// There is no error channel besides decode/encode failures: application
/// errors travel as fields of the response value.
pub struct Handler<Req, Resp> {
    /// Slot that incoming request bytes are decoded into.
    pub request: Req,
    callback: Box<dyn FnMut(&Req) -> Resp + Send>,
}

impl<Req, Resp> Handler<Req, Resp> {
    pub fn new<F>(request: Req, callback: F) -> Self
    where
        F: FnMut(&Req) -> Resp + Send + 'static,
    {
        Self {
            request,
            callback: Box::new(callback),
        }
    }

    /// Call the bound callback once with the current request slot.
    pub fn invoke(&mut self) -> Resp {
        (self.callback)(&self.request)
    }
}

impl<Req: Payload, Resp: Packer> Handler<Req, Resp> {
    /// Unpack `data` into the request slot, invoke and pack the response.
    pub fn respond(&mut self, data: &[u8]) -> Result<Bytes> {
        self.request.unpack(data)?;
        self.invoke().pack()
    }
}

impl<Req, Resp> RequestHandler for Handler<Req, Resp>
where
    Req: Payload + Send,
    Resp: Packer,
{
    fn handle(&mut self, data: &[u8]) -> Result<Bytes> {
        self.respond(data)
    }
}

impl<Req, Resp> std::fmt::Debug for Handler<Req, Resp>
where
    Req: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::error::CodecError;
    use crate::json::{json_handler, JsonPayload};
    use crate::raw::BytesPayload;

    #[test]
    fn respond_packs_callback_result() {
        let mut handler = Handler::new(BytesPayload::default(), |request: &BytesPayload| {
            let mut echoed = request.data.to_vec();
            echoed.reverse();
            BytesPayload::new(echoed)
        });

        let response = handler.respond(b"abc").unwrap();
        assert_eq!(response.as_ref(), b"cba");
    }

    #[test]
    fn decode_failure_skips_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut handler = json_handler(move |value: &u64| {
            counter.fetch_add(1, Ordering::SeqCst);
            value * 2
        });

        let erased: &mut dyn RequestHandler = &mut handler;
        assert!(matches!(erased.handle(b"[1,"), Err(CodecError::Decode(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let response = erased.handle(b"21").unwrap();
        assert_eq!(response.as_ref(), b"42");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invoke_reuses_last_request() {
        let mut handler = json_handler(|name: &String| format!("hello {name}"));
        handler.request.unpack(br#""peer""#).unwrap();

        assert_eq!(handler.invoke(), JsonPayload::new("hello peer".to_string()));
        assert_eq!(handler.invoke(), JsonPayload::new("hello peer".to_string()));
    }
}
