//! Minimal server side of the thin client protocol over an in memory stream.
#![allow(dead_code)]
use bytes::{Buf, BufMut, Bytes, BytesMut};
use ignis::{Config, Connection, WireValue, codec};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

pub struct Server {
    io: DuplexStream,
}

pub struct Request {
    pub op: i16,
    pub correlation_id: i64,
    pub payload: Bytes,
}

impl Server {
    async fn read_frame(&mut self) -> Bytes {
        let len = self.io.read_i32_le().await.unwrap();
        let mut body = vec![0; len as usize];
        self.io.read_exact(&mut body).await.unwrap();
        Bytes::from(body)
    }

    async fn write_frame(&mut self, body: &[u8]) {
        self.io.write_i32_le(body.len() as i32).await.unwrap();
        self.io.write_all(body).await.unwrap();
        self.io.flush().await.unwrap();
    }

    pub async fn recv(&mut self) -> Request {
        let mut frame = self.read_frame().await;
        let op = frame.get_i16_le();
        let correlation_id = frame.get_i64_le();
        Request { op, correlation_id, payload: frame }
    }

    /// Receive a request and reply with `payload`.
    pub async fn respond(&mut self, payload: &[u8]) -> Request {
        let request = self.recv().await;
        let mut body = BytesMut::new();
        body.put_i64_le(request.correlation_id);
        body.put_i32_le(0);
        body.put_slice(payload);
        self.write_frame(&body).await;
        request
    }

    /// Receive a request and fail it with `status`.
    pub async fn fail(&mut self, status: i32, message: &str) -> Request {
        let request = self.recv().await;
        let mut body = BytesMut::new();
        body.put_i64_le(request.correlation_id);
        body.put_i32_le(status);
        codec::encode(&message.into(), true, &mut body).unwrap();
        self.write_frame(&body).await;
        request
    }
}

/// Connect through a server which accepts any handshake.
pub async fn connect() -> (Connection, Server) {
    let (client, io) = tokio::io::duplex(64 * 1024);
    let mut server = Server { io };
    let accept = async {
        let mut handshake = server.read_frame().await;
        assert_eq!(handshake.get_u8(), 1);
        server.write_frame(&[1]).await;
    };
    let (conn, _) = tokio::join!(Connection::connect_stream(client, Config::default()), accept);
    (conn.unwrap(), server)
}

/// `i32 rowCount | rows | bool hasMore`
pub fn page(rows: &[&[WireValue]], has_more: bool) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_i32_le(rows.len() as i32);
    for value in rows.iter().flat_map(|row| row.iter()) {
        codec::encode(value, true, &mut buf).unwrap();
    }
    buf.put_u8(u8::from(has_more));
    buf
}

/// Response opening a sql fields cursor.
pub fn fields_cursor(id: i64, names: &[&str], page: BytesMut) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_i64_le(id);
    buf.put_i32_le(names.len() as i32);
    for name in names {
        codec::encode(&(*name).into(), true, &mut buf).unwrap();
    }
    buf.put_slice(&page);
    buf
}
