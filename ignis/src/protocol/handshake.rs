//! Connection handshake.
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::{fmt, str::FromStr};

use super::HandshakeError;
use crate::{
    Result,
    codec::{DecodeError, read_string},
    common::verbose,
    net::IgniteStream,
};

const OP_HANDSHAKE: u8 = 1;
const CLIENT_TYPE: u8 = 2;
const SUCCESS: u8 = 1;

// op, major, minor, patch, client type
const REQUEST_LEN: i32 = 1 + 2 + 2 + 2 + 1;

/// Protocol version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolVersion {
    pub major: i16,
    pub minor: i16,
    pub patch: i16,
}

impl ProtocolVersion {
    pub const V1_1_0: ProtocolVersion = ProtocolVersion::new(1, 1, 0);

    pub const fn new(major: i16, minor: i16, patch: i16) -> Self {
        Self { major, minor, patch }
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::V1_1_0
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ProtocolVersion {
    type Err = ();

    /// Parse `major.minor.patch`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '.').map(str::parse::<i16>);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(Ok(major)), Some(Ok(minor)), Some(Ok(patch))) => Ok(Self::new(major, minor, patch)),
            _ => Err(()),
        }
    }
}

/// Perform the handshake, must be the first exchange on the stream.
pub(crate) async fn handshake(stream: &mut IgniteStream, version: ProtocolVersion) -> Result<()> {
    verbose!("handshake, version {version}");
    write_request(version, stream.write_buf());
    stream.flush().await?;
    let body = stream.recv_frame().await?;
    read_response(version, body)
}

pub(crate) fn write_request(version: ProtocolVersion, buf: &mut BytesMut) {
    buf.put_i32_le(REQUEST_LEN);
    buf.put_u8(OP_HANDSHAKE);
    buf.put_i16_le(version.major);
    buf.put_i16_le(version.minor);
    buf.put_i16_le(version.patch);
    buf.put_u8(CLIENT_TYPE);
}

/// `body` excludes the length prefix.
pub(crate) fn read_response(requested: ProtocolVersion, mut body: Bytes) -> Result<()> {
    if body.try_get_u8().map_err(DecodeError::from)? == SUCCESS {
        return Ok(());
    }

    let server_version = read_version(&mut body)?;
    let message = read_string(&mut body)?;

    Err(HandshakeError { requested, server_version, message }.into())
}

fn read_version(body: &mut Bytes) -> Result<ProtocolVersion, DecodeError> {
    Ok(ProtocolVersion {
        major: body.try_get_i16_le()?,
        minor: body.try_get_i16_le()?,
        patch: body.try_get_i16_le()?,
    })
}
