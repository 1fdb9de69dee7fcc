use bytes::{Buf, Bytes};
use std::{sync::Arc, time::Duration};

use super::{Columns, Cursor, timeout_millis};
use crate::{
    Result,
    codec::{self, DecodeError, WireValue},
    executor::Executor,
    ext::{BytesExt, UsizeExt},
    hash::cache_id,
    protocol::{OP_QUERY_SQL_FIELDS, OP_QUERY_SQL_FIELDS_CURSOR_GET_PAGE},
    row::FromRow,
    transport::Transport,
};

/// Kind of statement a [`SqlFieldsQuery`] is allowed to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum StatementType {
    #[default]
    Any = 0,
    Select = 1,
    Update = 2,
}

/// SQL query returning selected columns.
///
/// Created by [`sql_fields`][super::sql_fields].
#[derive(Debug)]
#[must_use = "query does nothing unless it is fetched"]
pub struct SqlFieldsQuery<Exe> {
    exe: Exe,
    sql: String,
    args: Vec<WireValue>,
    cache: Option<String>,
    schema: Option<String>,
    page_size: Option<i32>,
    max_rows: i32,
    statement_type: StatementType,
    distributed_joins: bool,
    local: bool,
    replicated_only: bool,
    enforce_join_order: bool,
    collocated: bool,
    lazy: bool,
    timeout: Option<Duration>,
    include_field_names: bool,
}

impl<Exe> SqlFieldsQuery<Exe> {
    pub(crate) fn new(sql: String, exe: Exe) -> Self {
        Self {
            exe,
            sql,
            args: Vec::new(),
            cache: None,
            schema: None,
            page_size: None,
            max_rows: -1,
            statement_type: StatementType::Any,
            distributed_joins: false,
            local: false,
            replicated_only: false,
            enforce_join_order: false,
            collocated: false,
            lazy: false,
            timeout: None,
            include_field_names: true,
        }
    }

    /// Bind query argument.
    pub fn bind(mut self, value: impl Into<WireValue>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Cache the query runs against, by default the server resolves it from the schema.
    pub fn cache(mut self, name: impl Into<String>) -> Self {
        self.cache = Some(name.into());
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Rows per page, defaults to the transport page size.
    pub fn page_size(mut self, page_size: i32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Limit total rows, negative for unlimited.
    pub fn max_rows(mut self, max_rows: i32) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn statement_type(mut self, statement_type: StatementType) -> Self {
        self.statement_type = statement_type;
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

    pub fn enforce_join_order(mut self, enabled: bool) -> Self {
        self.enforce_join_order = enabled;
        self
    }

    pub fn collocated(mut self, enabled: bool) -> Self {
        self.collocated = enabled;
        self
    }

    pub fn lazy(mut self, enabled: bool) -> Self {
        self.lazy = enabled;
        self
    }

    /// Server side query timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether the server sends column names, enabled by default.
    ///
    /// Without names, rows can only be indexed by position.
    pub fn include_field_names(mut self, enabled: bool) -> Self {
        self.include_field_names = enabled;
        self
    }
}

impl<Exe: Executor> SqlFieldsQuery<Exe> {
    /// Run the query and open its cursor.
    pub async fn cursor(self) -> Result<Cursor<Exe::Transport>> {
        let mut io = self.exe.transport().await?;

        let mut request = io.begin_request(OP_QUERY_SQL_FIELDS);
        request
            .put_i32(self.cache.as_deref().map_or(0, cache_id))
            .put_u8(0)
            .write_str(self.schema.as_deref())?;
        request
            .put_i32(self.page_size.unwrap_or_else(|| io.page_size()))
            .put_i32(self.max_rows)
            .write_str(Some(self.sql.as_str()))?;
        request.put_i32(self.args.len().to_wire_len("query arguments")?);
        for arg in &self.args {
            request.write(arg)?;
        }
        request
            .put_u8(self.statement_type as u8)
            .put_bool(self.distributed_joins)
            .put_bool(self.local)
            .put_bool(self.replicated_only)
            .put_bool(self.enforce_join_order)
            .put_bool(self.collocated)
            .put_bool(self.lazy)
            .put_i64(timeout_millis(self.timeout))
            .put_bool(self.include_field_names);

        let mut payload = io.send_and_receive(request).await?.into_payload();
        let id = payload.try_get_i64_le().map_err(DecodeError::from)?;
        let columns = read_columns(&mut payload, self.include_field_names);

        Cursor::open(io, id, OP_QUERY_SQL_FIELDS_CURSOR_GET_PAGE, columns, payload).await
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

/// `i32 fieldCount | [tagged string × fieldCount]`
fn read_columns(payload: &mut Bytes, with_names: bool) -> Result<Columns, DecodeError> {
    let width = payload.try_get_len()?;
    if !with_names {
        return Ok(Columns { names: Arc::from([]), width });
    }

    let mut names = Vec::with_capacity(width.min(payload.remaining()));
    for _ in 0..width {
        names.push(codec::read_string(payload)?.unwrap_or_default());
    }
    Ok(Columns { names: names.into(), width })
}
