//! Connection pooling.
use std::{
    fmt,
    ops::{Deref, DerefMut},
    pin::Pin,
    task::{Context, Poll, ready},
};

use crate::{
    Config, Connection, Result,
    protocol::{RequestBuilder, Response},
    transport::Transport,
};

mod config;
mod worker;

pub use config::PoolConfig;

/// Connection pool.
///
/// Idle connections are owned by a background task, cloning the handle is cheap.
#[derive(Clone, Debug)]
pub struct Pool {
    handle: worker::WorkerHandle,
}

impl Pool {
    /// Create [`Pool`] from a url and try to create one connection.
    ///
    /// Pool size still follows [`PoolConfig::from_env`].
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with(PoolConfig::from_env().with_connection(Config::parse(url)?)).await
    }

    /// Create [`Pool`] from a url without trying to create connection.
    pub fn connect_lazy(url: &str) -> Result<Self> {
        Ok(Self::connect_lazy_with(PoolConfig::from_env().with_connection(Config::parse(url)?)))
    }

    /// Create [`Pool`] and try to create one connection.
    ///
    /// See [`Config::from_env`][1] for more details on env.
    ///
    /// [1]: crate::Config::from_env
    pub async fn connect_env() -> Result<Pool> {
        Self::connect_with(PoolConfig::from_env()).await
    }

    /// Create [`Pool`] and try to create one connection.
    pub async fn connect_with(config: PoolConfig) -> Result<Self> {
        let pool = Self::connect_lazy_with(config);
        pool.acquire().await?;
        Ok(pool)
    }

    /// Create [`Pool`] without trying to create connection.
    ///
    /// Must be called within tokio runtime.
    pub fn connect_lazy_with(config: PoolConfig) -> Self {
        let (handle, worker) = worker::WorkerHandle::new(config);
        tokio::spawn(worker);
        Self { handle }
    }

    /// Check out a connection, waiting for one to be released if the pool is full.
    pub fn acquire(&self) -> PoolConnect {
        PoolConnect { pool: Some(self.clone()), recv: None }
    }
}

/// Future returned from [`Pool::acquire`].
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct PoolConnect {
    pool: Option<Pool>,
    recv: Option<worker::AcquireRecv>,
}

impl Future for PoolConnect {
    type Output = Result<PoolConnection>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let me = &mut *self;
        let Some(pool) = me.pool.as_ref() else {
            panic!("`PoolConnect` polled after completion");
        };
        let recv = me.recv.get_or_insert_with(|| pool.handle.acquire());

        // sender only dropped by a worker shut down with the runtime
        let result = ready!(Pin::new(recv).poll(cx)).expect("pool worker closed");
        me.recv = None;
        let conn = result?;

        let pool = pool.clone();
        me.pool = None;
        Poll::Ready(Ok(PoolConnection { pool, conn: Some(conn) }))
    }
}

impl Drop for PoolConnect {
    fn drop(&mut self) {
        let (Some(pool), Some(mut recv)) = (self.pool.as_ref(), self.recv.take()) else {
            return;
        };
        // connection may already be in the channel
        recv.close();
        if let Ok(Ok(conn)) = recv.try_recv() {
            pool.handle.release(conn);
        }
    }
}

/// Instance of [`Pool`] with the checked out connection.
///
/// Returned to the pool on drop, broken connection is discarded instead.
pub struct PoolConnection {
    pool: Pool,
    conn: Option<Connection>,
}

impl PoolConnection {
    /// Returns the [`Pool`] handle.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Returns the underlying [`Connection`].
    pub fn connection(&mut self) -> &mut Connection {
        self
    }
}

impl Deref for PoolConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        // `conn` only `None` on drop
        self.conn.as_ref().expect("connection taken")
    }
}

impl DerefMut for PoolConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect("connection taken")
    }
}

impl Drop for PoolConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.handle.release(conn);
        }
    }
}

impl fmt::Debug for PoolConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PoolConnection").field(&self.conn).finish()
    }
}

impl Transport for PoolConnection {
    fn next_correlation_id(&mut self) -> i64 {
        self.connection().next_correlation_id()
    }

    fn send_and_receive(
        &mut self,
        request: RequestBuilder,
    ) -> impl Future<Output = Result<Response>> + Send {
        self.connection().send_and_receive(request)
    }

    fn defer_close(&mut self, resource_id: i64) {
        self.connection().defer_close(resource_id);
    }

    fn close_resource(&mut self, resource_id: i64) -> impl Future<Output = Result<()>> + Send {
        self.connection().close_resource(resource_id)
    }

    fn page_size(&self) -> i32 {
        self.config().get_page_size()
    }
}
