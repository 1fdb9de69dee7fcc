//! `ignis` error types.
use std::{backtrace::Backtrace, fmt, io};

use crate::{
    codec::{DecodeError, EncodeError},
    connection::ParseError,
    protocol::{ApplicationError, HandshakeError, TransportError, op_name},
    row::RowNotFound,
};

/// A specialized [`Result`] type for `ignis` operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All possible error from `ignis` library.
pub struct Error {
    context: String,
    backtrace: Backtrace,
    kind: ErrorKind,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Operation name and correlation id of the failed request, if any.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Returns `true` if the connection that produced this error must be discarded.
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    /// Returns `true` if the byte stream itself failed.
    pub(crate) fn is_connection_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Handshake(_) | ErrorKind::Transport(_))
    }

    pub(crate) fn with_request(mut self, op: i16, correlation_id: i64) -> Self {
        if self.context.is_empty() {
            self.context.push_str(op_name(op));
            self.context.push_str(" (id ");
            self.context.push_str(itoa::Buffer::new().format(correlation_id));
            self.context.push(')');
        }
        self
    }
}

/// All possible error kind from `ignis` library.
pub enum ErrorKind {
    Config(ParseError),
    Handshake(HandshakeError),
    Transport(TransportError),
    Application(ApplicationError),
    Decode(DecodeError),
    Encode(EncodeError),
    RowNotFound(RowNotFound),
}

impl ErrorKind {
    /// Handshake, transport and decode failures leave the connection unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Handshake(_) | Self::Transport(_) | Self::Decode(_))
    }
}

macro_rules! from {
    (<$ty:ty>$pat:pat => $body:expr) => {
        impl From<$ty> for Error {
            fn from($pat: $ty) -> Self {
                let backtrace = std::backtrace::Backtrace::capture();
                Self { context: String::new(), backtrace, kind: $body }
            }
        }
    };
}

from!(<ErrorKind>e => e);
from!(<ParseError>e => ErrorKind::Config(e));
from!(<HandshakeError>e => ErrorKind::Handshake(e));
from!(<TransportError>e => ErrorKind::Transport(e));
from!(<io::Error>e => ErrorKind::Transport(TransportError::Io(e)));
from!(<ApplicationError>e => ErrorKind::Application(e));
from!(<DecodeError>e => ErrorKind::Decode(e));
from!(<EncodeError>e => ErrorKind::Encode(e));
from!(<RowNotFound>e => ErrorKind::RowNotFound(e));

impl std::error::Error for Error { }

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.context.is_empty() {
            write!(f, "{}: ", self.context)?;
        }

        fmt::Display::fmt(&self.kind, f)?;

        if let std::backtrace::BacktraceStatus::Captured = self.backtrace.status() {
            let mut backtrace = self.backtrace.to_string();
            write!(f, "\n\n")?;
            writeln!(f, "Stack backtrace:")?;
            backtrace.truncate(backtrace.trim_end().len());
            write!(f, "{}", backtrace)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl std::error::Error for ErrorKind { }

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => e.fmt(f),
            Self::Handshake(e) => e.fmt(f),
            Self::Transport(e) => e.fmt(f),
            Self::Application(e) => e.fmt(f),
            Self::Decode(e) => e.fmt(f),
            Self::Encode(e) => e.fmt(f),
            Self::RowNotFound(e) => e.fmt(f),
        }
    }
}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
