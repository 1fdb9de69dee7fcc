use std::{borrow::Cow, fmt, str::Utf8Error, string::FromUtf8Error};

use super::TypeCode;

/// An error when decoding a value from the wire.
pub enum DecodeError {
    /// A value is present but it is not the requested type.
    UnexpectedType {
        expected: TypeCode,
        found: TypeCode,
    },
    /// Type discriminator is not in the registry.
    UnknownType(u8),
    /// Payload ended before the value did.
    Truncated {
        requested: usize,
        available: usize,
    },
    /// Server returns non utf8 string.
    Utf8(Utf8Error),
    /// Value bytes are present but inconsistent.
    Malformed(&'static str),
    /// Value is null where non null is required.
    Null,
    /// Column requested not found.
    ColumnNotFound(Cow<'static, str>),
    /// Index requested is out of bounds.
    IndexOutOfBounds(usize),
}

impl DecodeError {
    pub(crate) fn unexpected(expected: TypeCode, found: TypeCode) -> Self {
        Self::UnexpectedType { expected, found }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failed to decode value, ")?;
        match self {
            Self::UnexpectedType { expected, found } => {
                write!(f, "expected type {expected} found {found}")
            }
            Self::UnknownType(code) => write!(f, "unknown type code: {code}"),
            Self::Truncated { requested, available } => write!(
                f,
                "payload truncated, requested {requested} bytes but {available} available"
            ),
            Self::Utf8(e) => write!(f, "{e}"),
            Self::Malformed(reason) => write!(f, "malformed value: {reason}"),
            Self::Null => write!(f, "unexpected NULL value"),
            Self::ColumnNotFound(name) => write!(f, "column not found: {name:?}"),
            Self::IndexOutOfBounds(u) => write!(f, "index out of bounds: {u:?}"),
        }
    }
}

impl From<Utf8Error> for DecodeError {
    fn from(e: Utf8Error) -> Self {
        Self::Utf8(e)
    }
}

impl From<FromUtf8Error> for DecodeError {
    fn from(e: FromUtf8Error) -> Self {
        Self::Utf8(e.utf8_error())
    }
}

impl std::error::Error for DecodeError { }

impl fmt::Debug for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// An error when encoding a value to the wire.
pub enum EncodeError {
    /// Length does not fit the `i32` wire length.
    TooLarge {
        what: &'static str,
        len: usize,
    },
    /// Timestamp nanosecond remainder is outside `0..1_000_000`.
    InvalidNanos(u32),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failed to encode value, ")?;
        match self {
            Self::TooLarge { what, len } => write!(f, "{what} length {len} exceeds wire limit"),
            Self::InvalidNanos(n) => {
                write!(f, "nanosecond remainder {n} is not within a millisecond")
            }
        }
    }
}

impl std::error::Error for EncodeError { }

impl fmt::Debug for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
