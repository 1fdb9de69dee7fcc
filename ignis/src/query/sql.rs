use std::time::Duration;

use super::{Cursor, open_entries, timeout_millis};
use crate::{
    Result,
    codec::WireValue,
    executor::Executor,
    ext::UsizeExt,
    hash::cache_id,
    protocol::{OP_QUERY_SQL, OP_QUERY_SQL_CURSOR_GET_PAGE},
    row::FromRow,
    transport::Transport,
};

/// SQL query returning whole cache entries, as `(_KEY, _VAL)` rows.
///
/// Created by [`sql`][super::sql].
#[derive(Debug)]
#[must_use = "query does nothing unless it is fetched"]
pub struct SqlQuery<Exe> {
    exe: Exe,
    cache: String,
    table: String,
    sql: String,
    args: Vec<WireValue>,
    distributed_joins: bool,
    local: bool,
    replicated_only: bool,
    page_size: Option<i32>,
    timeout: Option<Duration>,
}

impl<Exe> SqlQuery<Exe> {
    pub(crate) fn new(cache: String, table: String, sql: String, exe: Exe) -> Self {
        Self {
            exe,
            cache,
            table,
            sql,
            args: Vec::new(),
            distributed_joins: false,
            local: false,
            replicated_only: false,
            page_size: None,
            timeout: None,
        }
    }

    /// Bind query argument.
    pub fn bind(mut self, value: impl Into<WireValue>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn distributed_joins(mut self, enabled: bool) -> Self {
        self.distributed_joins = enabled;
        self
    }

    pub fn local(mut self, enabled: bool) -> Self {
        self.local = enabled;
        self
    }

    pub fn replicated_only(mut self, enabled: bool) -> Self {
        self.replicated_only = enabled;
        self
    }

    /// Rows per page, defaults to the transport page size.
    pub fn page_size(mut self, page_size: i32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Server side query timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl<Exe: Executor> SqlQuery<Exe> {
    /// Run the query and open its cursor.
    pub async fn cursor(self) -> Result<Cursor<Exe::Transport>> {
        let mut io = self.exe.transport().await?;

        let mut request = io.begin_request(OP_QUERY_SQL);
        request
            .put_i32(cache_id(&self.cache))
            .put_u8(0)
            .write_str(Some(self.table.as_str()))?
            .write_str(Some(self.sql.as_str()))?;
        request.put_i32(self.args.len().to_wire_len("query arguments")?);
        for arg in &self.args {
            request.write(arg)?;
        }
        request
            .put_bool(self.distributed_joins)
            .put_bool(self.local)
            .put_bool(self.replicated_only)
            .put_i32(self.page_size.unwrap_or_else(|| io.page_size()))
            .put_i64(timeout_millis(self.timeout));

        open_entries(io, request, OP_QUERY_SQL_CURSOR_GET_PAGE).await
    }

    /// Fetch all rows into [`Vec`].
    pub async fn fetch_all<R: FromRow>(self) -> Result<Vec<R>> {
        self.cursor().await?.fetch_all().await
    }

    /// Fetch one row.
    pub async fn fetch_one<R: FromRow>(self) -> Result<R> {
        self.cursor().await?.fetch_one().await
    }

    /// Optionally fetch one row.
    pub async fn fetch_optional<R: FromRow>(self) -> Result<Option<R>> {
        self.cursor().await?.fetch_optional().await
    }
}
