use super::{Cursor, open_entries};
use crate::{
    Result,
    executor::Executor,
    hash::cache_id,
    protocol::{OP_QUERY_SCAN, OP_QUERY_SCAN_CURSOR_GET_PAGE},
    row::FromRow,
    transport::Transport,
};

/// Scan every entry of a cache, as `(_KEY, _VAL)` rows.
///
/// Created by [`scan`][super::scan].
#[derive(Debug)]
#[must_use = "query does nothing unless it is fetched"]
pub struct ScanQuery<Exe> {
    exe: Exe,
    cache: String,
    page_size: Option<i32>,
    partition: Option<i32>,
    local: bool,
}

impl<Exe> ScanQuery<Exe> {
    pub(crate) fn new(cache: String, exe: Exe) -> Self {
        Self { exe, cache, page_size: None, partition: None, local: false }
    }

    /// Rows per page, defaults to the transport page size.
    pub fn page_size(mut self, page_size: i32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Scan a single partition, by default every partition is scanned.
    pub fn partition(mut self, partition: i32) -> Self {
        self.partition = Some(partition);
        self
    }

    pub fn local(mut self, enabled: bool) -> Self {
        self.local = enabled;
        self
    }
}

impl<Exe: Executor> ScanQuery<Exe> {
    /// Run the query and open its cursor.
    pub async fn cursor(self) -> Result<Cursor<Exe::Transport>> {
        let mut io = self.exe.transport().await?;

        let mut request = io.begin_request(OP_QUERY_SCAN);
        request
            .put_i32(cache_id(&self.cache))
            .put_u8(0)
            // no filter object
            .write_str(None)?;
        request
            .put_i32(self.page_size.unwrap_or_else(|| io.page_size()))
            .put_i32(self.partition.unwrap_or(-1))
            .put_bool(self.local);

        open_entries(io, request, OP_QUERY_SCAN_CURSOR_GET_PAGE).await
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
