//! Request and response frames.
use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{ApplicationError, TransportError};
use crate::{
    Result,
    codec::{self, EncodeError, WireValue},
    ext::UsizeExt,
};

// op code + correlation id
const REQUEST_HEADER: usize = size_of::<i16>() + size_of::<i64>();
// correlation id + status
const RESPONSE_HEADER: usize = size_of::<i64>() + size_of::<i32>();

/// Accumulate a request payload.
///
/// Untagged `put_*` methods write fixed schema fields, [`write`][RequestBuilder::write]
/// writes a tagged payload member.
#[derive(Debug)]
pub struct RequestBuilder {
    op: i16,
    correlation_id: i64,
    payload: BytesMut,
}

impl RequestBuilder {
    pub fn new(op: i16, correlation_id: i64) -> Self {
        Self { op, correlation_id, payload: BytesMut::new() }
    }

    pub fn op(&self) -> i16 {
        self.op
    }

    pub fn correlation_id(&self) -> i64 {
        self.correlation_id
    }

    /// Payload written so far.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Write a tagged value.
    pub fn write(&mut self, value: &WireValue) -> Result<&mut Self, EncodeError> {
        codec::encode(value, true, &mut self.payload)?;
        Ok(self)
    }

    /// Write a tagged string, or a tagged null.
    pub fn write_str(&mut self, value: Option<&str>) -> Result<&mut Self, EncodeError> {
        codec::put_nullable_str(value, &mut self.payload)?;
        Ok(self)
    }

    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.payload.put_u8(value);
        self
    }

    pub fn put_bool(&mut self, value: bool) -> &mut Self {
        self.payload.put_u8(u8::from(value));
        self
    }

    pub fn put_i16(&mut self, value: i16) -> &mut Self {
        self.payload.put_i16_le(value);
        self
    }

    pub fn put_i32(&mut self, value: i32) -> &mut Self {
        self.payload.put_i32_le(value);
        self
    }

    pub fn put_i64(&mut self, value: i64) -> &mut Self {
        self.payload.put_i64_le(value);
        self
    }

    /// Write the whole frame, nothing is written on error.
    pub(crate) fn write_frame(&self, buf: &mut BytesMut) -> Result<(), EncodeError> {
        let len = (REQUEST_HEADER + self.payload.len()).to_wire_len("request")?;
        buf.reserve(size_of::<i32>() + REQUEST_HEADER + self.payload.len());
        buf.put_i32_le(len);
        buf.put_i16_le(self.op);
        buf.put_i64_le(self.correlation_id);
        buf.put_slice(&self.payload);
        Ok(())
    }
}

/// Successful response.
#[derive(Debug)]
pub struct Response {
    op: i16,
    correlation_id: i64,
    payload: Bytes,
}

impl Response {
    /// Parse a response frame, `frame` excludes the length prefix.
    ///
    /// Correlation mismatch is a [`TransportError`], non zero status is an
    /// [`ApplicationError`].
    pub(crate) fn decode(op: i16, expected: i64, mut frame: Bytes) -> Result<Self> {
        if frame.remaining() < RESPONSE_HEADER {
            return Err(TransportError::MalformedFrame("response shorter than header").into());
        }

        let correlation_id = frame.get_i64_le();
        if correlation_id != expected {
            return Err(TransportError::CorrelationMismatch { expected, found: correlation_id }.into());
        }

        match frame.get_i32_le() {
            0 => Ok(Self { op, correlation_id, payload: frame }),
            code => {
                let message = codec::read_string(&mut frame)?.unwrap_or_default();
                Err(ApplicationError { op, correlation_id, code, message }.into())
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn new(op: i16, correlation_id: i64, payload: Bytes) -> Self {
        Self { op, correlation_id, payload }
    }

    pub fn op(&self) -> i16 {
        self.op
    }

    pub fn correlation_id(&self) -> i64 {
        self.correlation_id
    }

    /// Remaining payload.
    pub fn payload(&mut self) -> &mut Bytes {
        &mut self.payload
    }

    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}
