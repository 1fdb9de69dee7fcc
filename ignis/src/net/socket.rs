use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Any byte stream a connection can run over.
pub trait AsyncIo: AsyncRead + AsyncWrite + Send + Unpin { }

impl<T> AsyncIo for T where T: AsyncRead + AsyncWrite + Send + Unpin { }

/// Either a `TcpStream` or a caller supplied stream, which implement
/// `AsyncRead` and `AsyncWrite` transparently.
pub struct Socket {
    kind: Kind,
}

enum Kind {
    Tcp(tokio::net::TcpStream),
    Boxed(Box<dyn AsyncIo>),
}

impl Socket {
    pub async fn connect_tcp(host: &str, port: u16) -> io::Result<Socket> {
        let socket = tokio::net::TcpStream::connect((host, port)).await?;
        socket.set_nodelay(true)?;
        Ok(Socket { kind: Kind::Tcp(socket) })
    }

    pub fn from_io<IO: AsyncIo + 'static>(io: IO) -> Socket {
        Socket { kind: Kind::Boxed(Box::new(io)) }
    }
}

impl AsyncRead for Socket {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut self.kind {
            Kind::Tcp(t) => Pin::new(t).poll_read(cx, buf),
            Kind::Boxed(b) => Pin::new(b).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Socket {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut self.kind {
            Kind::Tcp(t) => Pin::new(t).poll_write(cx, buf),
            Kind::Boxed(b) => Pin::new(b).poll_write(cx, buf),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut self.kind {
            Kind::Tcp(t) => Pin::new(t).poll_flush(cx),
            Kind::Boxed(b) => Pin::new(b).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut self.kind {
            Kind::Tcp(t) => Pin::new(t).poll_shutdown(cx),
            Kind::Boxed(b) => Pin::new(b).poll_shutdown(cx),
        }
    }
}

impl std::fmt::Debug for Socket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            Kind::Tcp(ref tcp) => std::fmt::Debug::fmt(tcp, f),
            Kind::Boxed(_) => f.write_str("Socket(Boxed)"),
        }
    }
}
