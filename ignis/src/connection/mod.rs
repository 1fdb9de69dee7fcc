//! Single thin client connection.
use std::{fmt, future::Future, mem};

use crate::{
    Result,
    common::{verbose, warning},
    error::Error,
    net::{AsyncIo, IgniteStream, Socket},
    protocol::{
        OP_RESOURCE_CLOSE, RequestBuilder, Response, TransportError, handshake,
    },
};

mod config;
mod correlation;

pub use config::{Config, ParseError};
pub use correlation::{IdGenerator, Sequential};

/// A single connection to a cluster node.
///
/// Send and receive strictly alternate, every round trip borrows the
/// connection exclusively.
///
/// A connection becomes *broken* after any transport failure, timeout, or when
/// a round trip future is dropped before its response arrives. Broken
/// connection fails every subsequent call and must be discarded.
pub struct Connection {
    stream: IgniteStream,
    config: Config,
    ids: Box<dyn IdGenerator>,
    state: State,
    /// cursor ids whose close is not yet sent
    pending_close: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ready,
    InFlight,
    Broken,
}

impl Connection {
    /// Connect to the node at `url`, see [`Config::parse`].
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with(Config::parse(url)?).await
    }

    /// Connect using [`Config::from_env`].
    pub async fn connect_env() -> Result<Self> {
        Self::connect_with(Config::from_env()).await
    }

    /// Connect over tcp and perform the handshake.
    pub async fn connect_with(config: Config) -> Result<Self> {
        let socket = Socket::connect_tcp(&config.host, config.port).await?;
        Self::establish(socket, config).await
    }

    /// Perform the handshake over an already open byte stream.
    pub async fn connect_stream<IO: AsyncIo + 'static>(io: IO, config: Config) -> Result<Self> {
        Self::establish(Socket::from_io(io), config).await
    }

    async fn establish(socket: Socket, config: Config) -> Result<Self> {
        let mut stream = IgniteStream::new(socket);
        with_timeout(&config, handshake::handshake(&mut stream, config.version)).await?;

        Ok(Self {
            stream,
            config,
            ids: Box::new(Sequential::new()),
            state: State::Ready,
            pending_close: Vec::new(),
        })
    }

    /// Replace the correlation id generator.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns `true` if connection can no longer be used.
    pub fn is_broken(&self) -> bool {
        self.state != State::Ready
    }

    /// Allocate the next correlation id.
    pub fn next_correlation_id(&mut self) -> i64 {
        self.ids.next_id()
    }

    /// Start a request with a fresh correlation id.
    pub fn begin_request(&mut self, op: i16) -> RequestBuilder {
        RequestBuilder::new(op, self.next_correlation_id())
    }

    /// Send request and receive its response.
    ///
    /// Deferred cursor closes are sent first.
    pub async fn send_and_receive(&mut self, request: RequestBuilder) -> Result<Response> {
        self.close_pending().await?;
        self.round_trip(request).await
    }

    /// Queue a server side resource to be closed before the next request.
    pub fn defer_close(&mut self, resource_id: i64) {
        self.pending_close.push(resource_id);
    }

    /// Send every deferred close now.
    ///
    /// Server failures are logged and swallowed, only transport failures are
    /// returned.
    pub async fn close_pending(&mut self) -> Result<()> {
        if self.pending_close.is_empty() {
            return Ok(());
        }

        for id in mem::take(&mut self.pending_close) {
            if let Err(err) = self.close_resource(id).await {
                if err.is_connection_error() {
                    return Err(err);
                }
                warning!("failed to close resource {id}: {err}");
            }
        }

        Ok(())
    }

    /// Explicitly close a server side resource.
    pub async fn close_resource(&mut self, resource_id: i64) -> Result<()> {
        let mut request = self.begin_request(OP_RESOURCE_CLOSE);
        request.put_i64(resource_id);
        self.round_trip(request).await.map(drop)
    }

    async fn round_trip(&mut self, request: RequestBuilder) -> Result<Response> {
        let op = request.op();
        let id = request.correlation_id();

        match self.state {
            State::Ready => { }
            State::InFlight => {
                self.state = State::Broken;
                return Err(Error::from(TransportError::Interrupted).with_request(op, id));
            }
            State::Broken => {
                return Err(Error::from(TransportError::Broken).with_request(op, id));
            }
        }

        verbose!("send {} (id {id})", crate::protocol::op_name(op));
        request
            .write_frame(self.stream.write_buf())
            .map_err(|e| Error::from(e).with_request(op, id))?;

        self.state = State::InFlight;
        let timeout = self.config.timeout;
        let result = match timeout {
            Some(t) => match tokio::time::timeout(t, self.exchange(op, id)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::TimedOut.into()),
            },
            None => self.exchange(op, id).await,
        };

        self.state = match &result {
            Err(err) if err.is_fatal() => State::Broken,
            _ => State::Ready,
        };
        verbose!("round trip done, state {:?}", self.state);

        result.map_err(|e| e.with_request(op, id))
    }

    async fn exchange(&mut self, op: i16, id: i64) -> Result<Response> {
        self.stream.flush().await?;
        let frame = self.stream.recv_frame().await?;
        Response::decode(op, id, frame)
    }

    /// Send deferred closes then shutdown the stream.
    pub async fn close(mut self) -> Result<()> {
        if self.state == State::Ready {
            self.close_pending().await?;
        }
        self.pending_close.clear();
        self.stream.shutdown().await?;
        Ok(())
    }
}

async fn with_timeout<T>(config: &Config, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match config.timeout {
        Some(t) => tokio::time::timeout(t, fut)
            .await
            .unwrap_or_else(|_| Err(TransportError::TimedOut.into())),
        None => fut.await,
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if !self.pending_close.is_empty() {
            warning!(
                "connection dropped with {} unsent resource close, server releases them on disconnect",
                self.pending_close.len()
            );
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("stream", &self.stream)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("pending_close", &self.pending_close)
            .finish_non_exhaustive()
    }
}
