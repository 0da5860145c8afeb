use bytes::Bytes;

use crate::error::Result;

/// Turns a typed value into bytes for crossing a byte-oriented boundary.
pub trait Packer {
    /// Serialize the held value.
    fn pack(&self) -> Result<Bytes>;
}

/// A reusable slot that bytes are decoded into.
///
/// On error the slot must keep its previous value so a caller never
/// observes partially decoded data.
pub trait Payload {
    /// Decode `data` into this slot.
    fn unpack(&mut self, data: &[u8]) -> Result<()>;
}

impl<P: Packer + ?Sized> Packer for &P {
    fn pack(&self) -> Result<Bytes> {
        (**self).pack()
    }
}

impl<P: Packer + ?Sized> Packer for Box<P> {
    fn pack(&self) -> Result<Bytes> {
        (**self).pack()
    }
}
