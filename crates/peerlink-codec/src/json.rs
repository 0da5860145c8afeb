use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{CodecError, Result};
use crate::handler::Handler;
use crate::listener::Listener;
use crate::packer::{Packer, Payload};

/// Structured payload encoded as JSON with field names preserved.
///
/// Decoding is lenient: unknown fields are ignored and fields missing from
/// an incoming object keep the value they have in `T::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonPayload<T> {
    pub model: T,
}

impl<T> JsonPayload<T> {
    pub fn new(model: T) -> Self {
        Self { model }
    }

    pub fn into_inner(self) -> T {
        self.model
    }
}

impl<T: Serialize> Packer for JsonPayload<T> {
    fn pack(&self) -> Result<Bytes> {
        serde_json::to_vec(&self.model)
            .map(Bytes::from)
            .map_err(CodecError::Encode)
    }
}

impl<T> Payload for JsonPayload<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    fn unpack(&mut self, data: &[u8]) -> Result<()> {
        let incoming: Value = serde_json::from_slice(data).map_err(CodecError::Decode)?;
        let merged = match (incoming, serde_json::to_value(T::default())) {
            (Value::Object(fields), Ok(Value::Object(mut base))) => {
                base.extend(fields);
                Value::Object(base)
            }
            (incoming, _) => incoming,
        };
        self.model = serde_json::from_value(merged).map_err(CodecError::Decode)?;
        Ok(())
    }
}

/// Bind a callback to a fresh JSON slot for `T`.
pub fn json_listener<T, F>(mut callback: F) -> Listener<JsonPayload<T>>
where
    T: Serialize + DeserializeOwned + Default + Send + 'static,
    F: FnMut(&T) + Send + 'static,
{
    Listener::new(JsonPayload::default(), move |message: &JsonPayload<T>| {
        callback(&message.model)
    })
}

/// Bind a request callback to a fresh JSON request slot.
pub fn json_handler<Req, Resp, F>(mut callback: F) -> Handler<JsonPayload<Req>, JsonPayload<Resp>>
where
    Req: Serialize + DeserializeOwned + Default + Send + 'static,
    Resp: Serialize + 'static,
    F: FnMut(&Req) -> Resp + Send + 'static,
{
    Handler::new(JsonPayload::default(), move |request: &JsonPayload<Req>| {
        JsonPayload::new(callback(&request.model))
    })
}
