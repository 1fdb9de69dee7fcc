//! Thin client binary protocol.
//!
//! Every integer is little endian. Header fields are never tagged, payload
//! members are tagged values as described in [`codec`][crate::codec].
//!
//! Handshake, the very first exchange on a connection:
//!
//! ```text
//! request
//! ┏━━━━━━━━┳━━━━┳━━━━━━━┳━━━━━━━┳━━━━━━━┳━━━━━━━━━━━━┓
//! ┃ Length ┃ Op ┃ Major ┃ Minor ┃ Patch ┃ ClientType ┃
//! ┣━━━━━━━━╋━━━━╋━━━━━━━╋━━━━━━━╋━━━━━━━╋━━━━━━━━━━━━┫
//! ┃  i32   ┃ 1  ┃  i16  ┃  i16  ┃  i16  ┃     2      ┃
//! ┗━━━━━━━━┻━━━━┻━━━━━━━┻━━━━━━━┻━━━━━━━┻━━━━━━━━━━━━┛
//!
//! response, version and message only present on failure
//! ┏━━━━━━━━┳━━━━━━━━┳━━━━━━━┳━━━━━━━┳━━━━━━━┳━━━━━━━━━━━━━━━┓
//! ┃ Length ┃ Result ┃ Major ┃ Minor ┃ Patch ┃ Message       ┃
//! ┣━━━━━━━━╋━━━━━━━━╋━━━━━━━╋━━━━━━━╋━━━━━━━╋━━━━━━━━━━━━━━━┫
//! ┃  i32   ┃   u8   ┃  i16  ┃  i16  ┃  i16  ┃ tagged string ┃
//! ┗━━━━━━━━┻━━━━━━━━┻━━━━━━━┻━━━━━━━┻━━━━━━━┻━━━━━━━━━━━━━━━┛
//! ```
//!
//! Operation:
//!
//! ```text
//! request
//! ┏━━━━━━━━┳━━━━━━━━┳━━━━━━━━━━━━━━━┳━━━━━━━━━┓
//! ┃ Length ┃ OpCode ┃ CorrelationId ┃ Payload ┃
//! ┣━━━━━━━━╋━━━━━━━━╋━━━━━━━━━━━━━━━╋━━━━━━━━━┫
//! ┃  i32   ┃  i16   ┃      i64      ┃   ...   ┃
//! ┗━━━━━━━━┻━━━━━━━━┻━━━━━━━━━━━━━━━┻━━━━━━━━━┛
//!
//! response, payload on status 0, tagged string message otherwise
//! ┏━━━━━━━━┳━━━━━━━━━━━━━━━┳━━━━━━━━┳━━━━━━━━━━━━━━━━━━━┓
//! ┃ Length ┃ CorrelationId ┃ Status ┃ Payload / Message ┃
//! ┣━━━━━━━━╋━━━━━━━━━━━━━━━╋━━━━━━━━╋━━━━━━━━━━━━━━━━━━━┫
//! ┃  i32   ┃      i64      ┃  i32   ┃        ...        ┃
//! ┗━━━━━━━━┻━━━━━━━━━━━━━━━┻━━━━━━━━┻━━━━━━━━━━━━━━━━━━━┛
//! ```
//!
//! `Length` never counts itself.
pub mod handshake;
pub mod frame;
mod error;

pub use handshake::ProtocolVersion;
pub use frame::{RequestBuilder, Response};
pub use error::{ApplicationError, HandshakeError, TransportError};

macro_rules! op_codes {
    ($($(#[$doc:meta])* $name:ident = $code:literal;)*) => {
        $(
            $(#[$doc])*
            pub const $name: i16 = $code;
        )*

        /// Name of an operation code, for diagnostics.
        pub fn op_name(op: i16) -> &'static str {
            match op {
                $($code => stringify!($name),)*
                _ => "OP_UNKNOWN",
            }
        }
    };
}

op_codes! {
    /// Close a server side resource, such as a cursor.
    OP_RESOURCE_CLOSE = 0;
    OP_QUERY_SCAN = 2000;
    OP_QUERY_SCAN_CURSOR_GET_PAGE = 2001;
    OP_QUERY_SQL = 2002;
    OP_QUERY_SQL_CURSOR_GET_PAGE = 2003;
    OP_QUERY_SQL_FIELDS = 2004;
    OP_QUERY_SQL_FIELDS_CURSOR_GET_PAGE = 2005;
}
