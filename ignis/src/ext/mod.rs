use bytes::{Buf, Bytes, TryGetError};

use crate::codec::{DecodeError, EncodeError};

/// Lengths are `usize` in rust while the wire wants `i32`.
pub trait UsizeExt {
    /// Convert a length into its wire form, failing instead of wrapping.
    fn to_wire_len(self, what: &'static str) -> Result<i32, EncodeError>;
}

/// Bounds checked reads on received payload.
///
/// [`Buf`] getters panics on short buffer, payload from the network must never panic.
pub trait BytesExt {
    /// Split off exactly `len` bytes.
    fn try_split_to(&mut self, len: usize) -> Result<Bytes, DecodeError>;

    /// Read a wire length prefix, negative length is malformed.
    fn try_get_len(&mut self) -> Result<usize, DecodeError>;
}

impl UsizeExt for usize {
    fn to_wire_len(self, what: &'static str) -> Result<i32, EncodeError> {
        i32::try_from(self).map_err(|_| EncodeError::TooLarge { what, len: self })
    }
}

impl BytesExt for Bytes {
    fn try_split_to(&mut self, len: usize) -> Result<Bytes, DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::Truncated {
                requested: len,
                available: self.remaining(),
            });
        }
        Ok(self.split_to(len))
    }

    fn try_get_len(&mut self) -> Result<usize, DecodeError> {
        let len = self.try_get_i32_le()?;
        usize::try_from(len).map_err(|_| DecodeError::Malformed("negative length"))
    }
}

impl From<TryGetError> for DecodeError {
    fn from(err: TryGetError) -> Self {
        DecodeError::Truncated {
            requested: err.requested,
            available: err.available,
        }
    }
}
