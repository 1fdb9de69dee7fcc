//! Binary value codec.
//!
//! Every integer on the wire is little endian. A *tagged* value is preceded by
//! its one byte [`TypeCode`], an *untagged* value is not and the reader must
//! know its type beforehand.
//!
//! ```text
//! ┏━━━━━━━━━━┳━━━━━━━━━━━━━━━━━━┓
//! ┃ TypeCode ┃ Body             ┃
//! ┣━━━━━━━━━━╋━━━━━━━━━━━━━━━━━━┫
//! ┃    u8    ┃ depends on type  ┃
//! ┗━━━━━━━━━━┻━━━━━━━━━━━━━━━━━━┛
//! ```
//!
//! - strings are `i32` byte length followed by utf8 bytes, null is the tag `101`
//! - primitive arrays are `i32` count followed by untagged elements
//! - string, uuid and temporal arrays are `i32` count followed by tagged elements
//! - timestamp is `i64` millis followed by `i32` sub-millisecond nanos
//!
//! Decoding never panics on short input, it fails with [`DecodeError::Truncated`].
mod type_code;
mod value;
mod temporal;
mod complex;
mod uuid;
mod from_wire;
mod encode;
mod decode;
mod error;

#[cfg(feature = "time")]
mod time;

pub use type_code::TypeCode;
pub use value::WireValue;
pub use temporal::{Date, Time, Timestamp};
pub use complex::{ComplexObject, FLAG_HAS_SCHEMA, FLAG_USER_TYPE};
pub use from_wire::FromWire;
pub use encode::{encode, to_bytes};
pub use decode::{decode, decode_as, decode_expect, decode_untagged, read_string};
pub use error::{DecodeError, EncodeError};

pub(crate) use encode::put_nullable_str;
