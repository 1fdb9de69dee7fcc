//! Scripted peers for tests.
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::{collections::VecDeque, future::Future};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream};

use crate::{
    Config, Connection, Error, Result,
    codec::{WireValue, encode},
    protocol::{ProtocolVersion, RequestBuilder, Response},
    transport::Transport,
};

/// Server end of a byte stream, reading requests and writing scripted responses.
pub(crate) struct MockServer<IO = DuplexStream> {
    io: IO,
}

/// Request as seen by the server.
#[derive(Debug)]
pub(crate) struct Request {
    pub op: i16,
    pub correlation_id: i64,
    pub payload: Bytes,
}

impl MockServer {
    /// Returns the client end and the server.
    pub fn pair() -> (DuplexStream, MockServer) {
        let (client, server) = tokio::io::duplex(64 * 1024);
        (client, MockServer { io: server })
    }
}

impl<IO: AsyncRead + AsyncWrite + Unpin> MockServer<IO> {
    pub fn new(io: IO) -> Self {
        Self { io }
    }

    async fn read_frame(&mut self) -> Bytes {
        let len = self.io.read_i32_le().await.unwrap();
        let mut body = vec![0; len as usize];
        self.io.read_exact(&mut body).await.unwrap();
        Bytes::from(body)
    }

    pub async fn write_frame(&mut self, body: &[u8]) {
        self.io.write_i32_le(body.len() as i32).await.unwrap();
        self.io.write_all(body).await.unwrap();
        self.io.flush().await.unwrap();
    }

    async fn read_handshake(&mut self) -> ProtocolVersion {
        let mut frame = self.read_frame().await;
        assert_eq!(frame.get_u8(), 1, "handshake op");
        let version = ProtocolVersion::new(frame.get_i16_le(), frame.get_i16_le(), frame.get_i16_le());
        assert_eq!(frame.get_u8(), 2, "client type");
        version
    }

    pub async fn accept_handshake(&mut self) -> ProtocolVersion {
        let version = self.read_handshake().await;
        self.write_frame(&[1]).await;
        version
    }

    pub async fn reject_handshake(&mut self, supported: ProtocolVersion, message: &str) {
        self.read_handshake().await;
        let mut body = BytesMut::new();
        body.put_u8(0);
        body.put_i16_le(supported.major);
        body.put_i16_le(supported.minor);
        body.put_i16_le(supported.patch);
        encode(&message.into(), true, &mut body).unwrap();
        self.write_frame(&body).await;
    }

    pub async fn recv(&mut self) -> Request {
        let mut frame = self.read_frame().await;
        let op = frame.get_i16_le();
        let correlation_id = frame.get_i64_le();
        Request { op, correlation_id, payload: frame }
    }

    pub async fn reply(&mut self, correlation_id: i64, payload: &[u8]) {
        let mut body = BytesMut::new();
        body.put_i64_le(correlation_id);
        body.put_i32_le(0);
        body.put_slice(payload);
        self.write_frame(&body).await;
    }

    pub async fn reply_error(&mut self, correlation_id: i64, status: i32, message: &str) {
        let mut body = BytesMut::new();
        body.put_i64_le(correlation_id);
        body.put_i32_le(status);
        encode(&message.into(), true, &mut body).unwrap();
        self.write_frame(&body).await;
    }

    /// Receive a request and reply with `payload`.
    pub async fn respond(&mut self, payload: &[u8]) -> Request {
        let request = self.recv().await;
        self.reply(request.correlation_id, payload).await;
        request
    }
}

/// Open a connection against a mock server which accepts the handshake.
pub(crate) async fn connect(config: Config) -> (Connection, MockServer) {
    let (client, mut server) = MockServer::pair();
    let (conn, _) = tokio::join!(Connection::connect_stream(client, config), server.accept_handshake());
    (conn.unwrap(), server)
}

/// Encode one result page: `i32 rowCount | rows | bool hasMore`.
pub(crate) fn page(rows: &[&[WireValue]], has_more: bool) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_i32_le(rows.len() as i32);
    for row in rows {
        for value in *row {
            encode(value, true, &mut buf).unwrap();
        }
    }
    buf.put_u8(u8::from(has_more));
    buf
}

/// In memory transport replaying scripted responses.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    next_id: i64,
    responses: VecDeque<Result<Bytes>>,
    /// op code and payload of every request
    pub sent: Vec<(i16, Bytes)>,
    pub deferred: Vec<i64>,
    pub closed: Vec<i64>,
}

impl ScriptedTransport {
    pub fn push(&mut self, payload: impl Into<Bytes>) -> &mut Self {
        self.responses.push_back(Ok(payload.into()));
        self
    }

    pub fn push_err(&mut self, err: impl Into<Error>) -> &mut Self {
        self.responses.push_back(Err(err.into()));
        self
    }

    pub fn ops(&self) -> Vec<i16> {
        self.sent.iter().map(|(op, _)| *op).collect()
    }
}

impl Transport for ScriptedTransport {
    fn next_correlation_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn send_and_receive(
        &mut self,
        request: RequestBuilder,
    ) -> impl Future<Output = Result<Response>> + Send {
        let op = request.op();
        let id = request.correlation_id();
        self.sent.push((op, Bytes::copy_from_slice(request.payload())));
        let result = match self.responses.pop_front() {
            Some(Ok(payload)) => Ok(Response::new(op, id, payload)),
            Some(Err(err)) => Err(err),
            None => panic!("no scripted response for op {op}"),
        };
        std::future::ready(result)
    }

    fn defer_close(&mut self, resource_id: i64) {
        self.deferred.push(resource_id);
    }

    fn close_resource(&mut self, resource_id: i64) -> impl Future<Output = Result<()>> + Send {
        self.closed.push(resource_id);
        std::future::ready(Ok(()))
    }

    fn page_size(&self) -> i32 {
        1024
    }
}
