use std::env::var;

use crate::Config;

const DEFAULT_MAX_CONN: usize = 10;

/// How many connections a [`Pool`][super::Pool] may open, and how.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub(crate) conn: Config,
    pub(crate) max_conn: usize,
}

impl PoolConfig {
    pub fn new(conn: Config) -> PoolConfig {
        Self { conn, max_conn: DEFAULT_MAX_CONN }
    }

    /// [`Config::from_env`], with the pool size read from `IGNITE_POOL_MAX`.
    pub fn from_env() -> PoolConfig {
        let config = Self::new(Config::from_env());
        match var("IGNITE_POOL_MAX").ok().and_then(|e| e.parse().ok()) {
            Some(max) => config.max_connection(max),
            None => config,
        }
    }

    pub fn connection(&self) -> &Config {
        &self.conn
    }

    /// Replace the config every new connection is opened with.
    pub fn with_connection(mut self, conn: Config) -> Self {
        self.conn = conn;
        self
    }

    /// Upper bound of open connections, at least one.
    pub fn max_connection(mut self, value: usize) -> Self {
        self.max_conn = value.max(1);
        self
    }
}

impl From<Config> for PoolConfig {
    fn from(conn: Config) -> Self {
        Self::new(conn)
    }
}
