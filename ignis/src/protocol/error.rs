//! Protocol level errors.
use std::{fmt, io};

use super::{ProtocolVersion, op_name};

/// Server rejected the handshake.
///
/// The connection must not be used afterwards.
pub struct HandshakeError {
    pub(crate) requested: ProtocolVersion,
    pub(crate) server_version: ProtocolVersion,
    pub(crate) message: Option<String>,
}

impl HandshakeError {
    /// Version sent by this client.
    pub fn requested(&self) -> ProtocolVersion {
        self.requested
    }

    /// Version the server supports.
    pub fn server_version(&self) -> ProtocolVersion {
        self.server_version
    }

    /// Server message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl std::error::Error for HandshakeError { }

impl fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "handshake rejected, requested version {} but server supports {}",
            self.requested, self.server_version,
        )?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// Failure of the byte stream or its framing.
///
/// Every variant is fatal, the connection cannot be resynchronized and must be
/// discarded.
pub enum TransportError {
    Io(io::Error),
    /// Response does not belong to the request just sent.
    CorrelationMismatch {
        expected: i64,
        found: i64,
    },
    /// Frame header is inconsistent.
    MalformedFrame(&'static str),
    /// Round trip exceeds the configured deadline.
    TimedOut,
    /// Connection failed previously.
    Broken,
    /// Previous request was cancelled before its response was read.
    Interrupted,
}

impl std::error::Error for TransportError { }

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => e.fmt(f),
            Self::CorrelationMismatch { expected, found } => write!(
                f,
                "correlation id mismatch, expected {expected} found {found}"
            ),
            Self::MalformedFrame(reason) => write!(f, "malformed frame: {reason}"),
            Self::TimedOut => f.write_str("request timed out"),
            Self::Broken => f.write_str("connection is broken by previous failure"),
            Self::Interrupted => f.write_str("previous request was cancelled mid flight"),
        }
    }
}

impl fmt::Debug for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Server returned non zero status.
///
/// The connection stays usable.
pub struct ApplicationError {
    pub(crate) op: i16,
    pub(crate) correlation_id: i64,
    pub(crate) code: i32,
    pub(crate) message: String,
}

impl ApplicationError {
    /// Operation code of the failed request.
    pub fn op(&self) -> i16 {
        self.op
    }

    pub fn correlation_id(&self) -> i64 {
        self.correlation_id
    }

    /// Server status code.
    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::error::Error for ApplicationError { }

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (id {}) failed with status {}: {}",
            op_name(self.op), self.correlation_id, self.code, self.message,
        )
    }
}

impl fmt::Debug for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
