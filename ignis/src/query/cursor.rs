//! The [`Cursor`] type.
use bytes::{Buf, Bytes};
use std::{fmt, sync::Arc, sync::atomic::Ordering};

use super::LEAKED_CURSORS;
use crate::{
    Result,
    codec::{self, DecodeError},
    common::{span, verbose, warning},
    error::Error,
    ext::BytesExt,
    row::{FromRow, Row, RowNotFound},
    transport::Transport,
};

/// Lifecycle of a [`Cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Server created the cursor, first page not yet loaded.
    Created,
    /// A page is buffered, its rows or trailing `hasMore` not yet consumed.
    HasBufferedRows,
    /// Next page requested.
    FetchingNextPage,
    /// Server signaled no more pages and released the cursor.
    Exhausted,
    /// Closed by client.
    Closed,
}

/// Column layout shared by every row of a cursor.
#[derive(Debug, Clone)]
pub(crate) struct Columns {
    pub names: Arc<[String]>,
    pub width: usize,
}

/// An open server side query cursor.
///
/// Rows are decoded lazily from the buffered page, pages are fetched on demand.
///
/// If not exhausted or closed, when this structure is dropped, its close is
/// deferred to the transport, which sends it before the next request.
///
/// # Example
///
/// ```no_run
/// # async fn app(mut conn: ignis::Connection) -> ignis::Result<()> {
/// let mut cursor = ignis::query::sql_fields("SELECT id, name FROM person", &mut conn)
///     .page_size(100)
///     .cursor()
///     .await?;
///
/// while let Some(row) = cursor.next_row().await? {
///     let id: i64 = row.try_get("id")?;
///     println!("{id}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct Cursor<IO: Transport> {
    io: IO,
    id: i64,
    page_op: i16,
    columns: Columns,
    page: Bytes,
    /// rows left in `page`, `hasMore` follows them
    remaining: usize,
    state: CursorState,
}

impl<IO> Cursor<IO>
where
    IO: Transport,
{
    /// Take ownership of a freshly created server cursor.
    ///
    /// Failure to read the column header or the first page closes the cursor.
    pub(crate) async fn open(
        io: IO,
        id: i64,
        page_op: i16,
        columns: Result<Columns, DecodeError>,
        page: Bytes,
    ) -> Result<Self> {
        let mut cursor = Self {
            io,
            id,
            page_op,
            columns: Columns { names: Arc::from([]), width: 0 },
            page: Bytes::new(),
            remaining: 0,
            state: CursorState::Created,
        };

        let loaded = columns.and_then(|columns| {
            cursor.columns = columns;
            cursor.load_page(page)
        });

        match loaded {
            Ok(()) => Ok(cursor),
            Err(err) => Err(cursor.abort(err.into()).await),
        }
    }

    /// Server side cursor id.
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Column names, empty if the query did not request them.
    pub fn names(&self) -> &[String] {
        &self.columns.names
    }

    /// Returns the next row, fetching the next page when the buffered one is consumed.
    ///
    /// Returns [`None`] once the server signaled no more pages, or after close.
    pub async fn next_row(&mut self) -> Result<Option<Row>> {
        loop {
            match self.state {
                CursorState::Exhausted | CursorState::Closed => return Ok(None),
                CursorState::Created | CursorState::FetchingNextPage => {
                    self.fetch_page().await?;
                    continue;
                }
                CursorState::HasBufferedRows => { }
            }

            if self.remaining > 0 {
                return match self.decode_row() {
                    Ok(row) => {
                        self.remaining -= 1;
                        Ok(Some(row))
                    }
                    Err(err) => Err(self.abort(err.into()).await),
                };
            }

            match self.page.try_get_u8() {
                Ok(0) => {
                    verbose!("cursor {} exhausted", self.id);
                    self.state = CursorState::Exhausted;
                    self.page = Bytes::new();
                    return Ok(None);
                }
                Ok(_) => self.fetch_page().await?,
                Err(err) => return Err(self.abort(DecodeError::from(err).into()).await),
            }
        }
    }

    /// Close the server side cursor.
    ///
    /// Does nothing if the cursor is exhausted or already closed.
    pub async fn close(&mut self) -> Result<()> {
        if matches!(self.state, CursorState::Exhausted | CursorState::Closed) {
            return Ok(());
        }
        let released = self.server_released();
        self.page = Bytes::new();
        self.remaining = 0;
        if released {
            self.state = CursorState::Exhausted;
            return Ok(());
        }
        self.state = CursorState::Closed;
        verbose!("close cursor {}", self.id);
        self.io.close_resource(self.id).await
    }

    /// Drain every remaining row.
    pub async fn fetch_all<R: FromRow>(mut self) -> Result<Vec<R>> {
        let mut output = Vec::new();
        while let Some(row) = self.next_row().await? {
            output.push(self.convert(row).await?);
        }
        Ok(output)
    }

    /// Returns the first row, closing the cursor.
    pub async fn fetch_one<R: FromRow>(self) -> Result<R> {
        match self.fetch_optional().await? {
            Some(row) => Ok(row),
            None => Err(RowNotFound.into()),
        }
    }

    /// Returns the first row if any, closing the cursor.
    pub async fn fetch_optional<R: FromRow>(mut self) -> Result<Option<R>> {
        let Some(row) = self.next_row().await? else {
            return Ok(None);
        };
        let row = self.convert(row).await?;
        self.close_quietly().await;
        Ok(Some(row))
    }

    async fn fetch_page(&mut self) -> Result<()> {
        self.state = CursorState::FetchingNextPage;

        let mut request = self.io.begin_request(self.page_op);
        request.put_i64(self.id);

        let page = match self.io.send_and_receive(request).await {
            Ok(response) => response.into_payload(),
            Err(err) => return Err(self.abort(err).await),
        };

        match self.load_page(page) {
            Ok(()) => Ok(()),
            Err(err) => Err(self.abort(err.into()).await),
        }
    }

    /// Buffered page is the last one, `hasMore` trails the rows.
    fn server_released(&self) -> bool {
        self.state == CursorState::HasBufferedRows && self.page.last() == Some(&0)
    }

    fn load_page(&mut self, mut page: Bytes) -> Result<(), DecodeError> {
        let rows = page.try_get_len()?;
        // every value carries at least its tag byte
        let least = rows.saturating_mul(self.columns.width);
        if page.remaining() < least {
            return Err(DecodeError::Truncated { requested: least, available: page.remaining() });
        }
        verbose!("cursor {} page of {rows} rows", self.id);
        self.remaining = rows;
        self.page = page;
        self.state = CursorState::HasBufferedRows;
        Ok(())
    }

    fn decode_row(&mut self) -> Result<Row, DecodeError> {
        span!("decode_row", cursor = self.id);
        let mut values = Vec::with_capacity(self.columns.width);
        for _ in 0..self.columns.width {
            values.push(codec::decode(&mut self.page)?);
        }
        Ok(Row::new(self.columns.names.clone(), values))
    }

    async fn convert<R: FromRow>(&mut self, row: Row) -> Result<R> {
        match R::from_row(row) {
            Ok(ok) => Ok(ok),
            Err(err) => Err(self.abort(err.into()).await),
        }
    }

    /// Close after a failure, returning the original error.
    async fn abort(&mut self, err: Error) -> Error {
        if err.is_connection_error() {
            // server releases cursors of a dead connection
            self.state = CursorState::Closed;
            return err;
        }
        self.close_quietly().await;
        err
    }

    async fn close_quietly(&mut self) {
        if let Err(err) = self.close().await {
            warning!("failed to close cursor {}: {err}", self.id);
        }
    }
}

impl<IO> Drop for Cursor<IO>
where
    IO: Transport,
{
    fn drop(&mut self) {
        if matches!(self.state, CursorState::Exhausted | CursorState::Closed) || self.server_released() {
            return;
        }
        LEAKED_CURSORS.fetch_add(1, Ordering::Relaxed);
        warning!("cursor {} dropped while open, close deferred", self.id);
        self.io.defer_close(self.id);
    }
}

impl<IO> fmt::Debug for Cursor<IO>
where
    IO: Transport,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}
