use bytes::{Buf, Bytes, BytesMut};
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::Socket;
use crate::{common::verbose, protocol::TransportError};

const DEFAULT_BUF_CAPACITY: usize = 1024;
const LEN_PREFIX: usize = size_of::<i32>();
/// Upper bound of a single reservation, large frames grow while they arrive.
const MAX_RESERVE: usize = 64 * 1024;

/// Buffered connection reading and writing length prefixed frames.
#[derive(Debug)]
pub struct IgniteStream {
    socket: Socket,
    read_buf: BytesMut,
    write_buf: BytesMut,
}

impl IgniteStream {
    pub fn new(socket: Socket) -> Self {
        Self {
            socket,
            read_buf: BytesMut::with_capacity(DEFAULT_BUF_CAPACITY),
            write_buf: BytesMut::with_capacity(DEFAULT_BUF_CAPACITY),
        }
    }

    /// Frames are written here, then sent by [`IgniteStream::flush`].
    pub fn write_buf(&mut self) -> &mut BytesMut {
        &mut self.write_buf
    }

    /// Write all buffered frames to the socket.
    pub async fn flush(&mut self) -> io::Result<()> {
        verbose!("flush {} bytes", self.write_buf.len());
        self.socket.write_all_buf(&mut self.write_buf).await?;
        self.socket.flush().await
    }

    /// Receive one frame, the returned bytes exclude the length prefix.
    pub async fn recv_frame(&mut self) -> Result<Bytes, TransportError> {
        loop {
            if let Some(mut header) = self.read_buf.get(..LEN_PREFIX) {
                let len = header.get_i32_le();
                let Ok(len) = usize::try_from(len) else {
                    return Err(TransportError::MalformedFrame("negative frame length"));
                };

                if self.read_buf.len() - LEN_PREFIX >= len {
                    self.read_buf.advance(LEN_PREFIX);
                    verbose!("recv frame of {len} bytes");
                    return Ok(self.read_buf.split_to(len).freeze());
                }

                let missing = LEN_PREFIX + len - self.read_buf.len();
                self.read_buf.reserve(missing.min(MAX_RESERVE));
            }

            if self.socket.read_buf(&mut self.read_buf).await? == 0 {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
            }
        }
    }

    /// Shutdown the write half.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.socket.shutdown().await
    }
}
