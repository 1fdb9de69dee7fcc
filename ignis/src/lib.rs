//! Apache Ignite Thin Client
//!
//! # Examples
//!
//! Single connection:
//!
//! ```no_run
//! use ignis::Connection;
//!
//! # async fn app() -> ignis::Result<()> {
//! let mut conn = Connection::connect("ignite://127.0.0.1:10800").await?;
//!
//! let (id, name) = ignis::query::sql_fields("SELECT id, name FROM person WHERE id = ?", &mut conn)
//!     .schema("PUBLIC")
//!     .bind(42i64)
//!     .fetch_one::<(i64, String)>()
//!     .await?;
//!
//! assert_eq!(id, 42);
//! println!("{name}");
//! # Ok(())
//! # }
//! ```
//!
//! Paging through a cursor:
//!
//! ```no_run
//! # async fn app(mut conn: ignis::Connection) -> ignis::Result<()> {
//! let mut cursor = ignis::query::scan("person", &mut conn)
//!     .page_size(256)
//!     .cursor()
//!     .await?;
//!
//! while let Some(row) = cursor.next_row().await? {
//!     println!("{:?} => {:?}", row.get(0)?, row.get(1)?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Connection pooling:
//!
//! ```no_run
//! use ignis::Pool;
//!
//! # async fn app() -> ignis::Result<()> {
//! let pool = Pool::connect_env().await?;
//!
//! let mut handles = vec![];
//!
//! for i in 0..14i64 {
//!     let pool = pool.clone();
//!     let t = tokio::spawn(async move {
//!         ignis::query::sql_fields("INSERT INTO foo(id) VALUES(?)", &pool)
//!             .bind(i)
//!             .fetch_all::<()>()
//!             .await
//!     });
//!     handles.push(t);
//! }
//!
//! for h in handles {
//!     h.await.unwrap();
//! }
//! # Ok(())
//! # }
//! # mod tokio { pub fn spawn<F>(_: F) -> F { todo!() } }
//! ```
mod common;
mod ext;
pub mod net;

// Protocol
pub mod protocol;
pub mod hash;

// Encoding
pub mod codec;

// Component
pub mod row;

// Operation
pub mod transport;
pub mod executor;
pub mod query;

// Connection
pub mod connection;
pub mod pool;

mod error;

#[cfg(test)]
mod test_support;

pub use codec::{ComplexObject, FromWire, WireValue};
pub use row::{Row, FromRow};

pub use executor::Executor;
pub use transport::Transport;
pub use connection::{Connection, Config};
pub use pool::{Pool, PoolConfig, PoolConnection};
pub use error::{Error, ErrorKind, Result};
