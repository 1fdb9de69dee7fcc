//! Byte stream plumbing.
mod socket;
mod stream;

pub use socket::{AsyncIo, Socket};
pub use stream::IgniteStream;
