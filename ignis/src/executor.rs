//! Where queries get their [`Transport`] from.
//!
//! Borrowed transports are ready immediately, a [`Pool`] checks out a
//! connection which goes back to the pool once the query is done.
use std::future::{Future, Ready, ready};

use crate::{
    Result,
    pool::{Pool, PoolConnect, PoolConnection},
    transport::Transport,
};

/// Source of a [`Transport`] for a single query.
pub trait Executor {
    type Transport: Transport;

    type Future: Future<Output = Result<Self::Transport>> + Send;

    /// Resolve to the transport the query runs on.
    fn transport(self) -> Self::Future;
}

impl<T: Transport> Executor for &mut T {
    type Transport = Self;
    type Future = Ready<Result<Self>>;

    fn transport(self) -> Self::Future {
        ready(Ok(self))
    }
}

macro_rules! pooled {
    ($($ty:ty),*) => {$(
        impl Executor for $ty {
            type Transport = PoolConnection;
            type Future = PoolConnect;

            fn transport(self) -> Self::Future {
                self.acquire()
            }
        }
    )*};
}

pooled!(Pool, &Pool, &mut Pool);

#[cfg(test)]
mod test {
    use super::Executor;
    use crate::{Connection, Pool, PoolConnection, Row, query::{scan, sql_fields}};

    #[allow(unused, reason = "type assertion")]
    async fn generic_executor<E: Executor>(e: E) {
        let _ = sql_fields("", e).fetch_all::<Row>().await;
    }

    #[allow(unused, reason = "type assertion")]
    async fn reused_transport<E: Executor>(e: E) {
        let mut io = e.transport().await.unwrap();
        let _ = sql_fields("", &mut io).fetch_all::<Row>().await;
        let _ = scan("cache", &mut io).fetch_all::<Row>().await;
    }

    #[allow(unused, reason = "type assertion")]
    fn queries_are_send(conn: &mut Connection, pooled: &mut PoolConnection, pool: &Pool) {
        fn send<F: Send>(_: F) { }
        send(sql_fields("", &mut *conn).fetch_all::<Row>());
        send(scan("cache", &mut *pooled).fetch_all::<Row>());
        send(sql_fields("", pool).fetch_all::<Row>());
        send(sql_fields("", pool.clone()).fetch_one::<Row>());
    }
}
