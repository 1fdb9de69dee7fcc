//! Paging query API.
//!
//! Each query opens a server side [`Cursor`], whose rows arrive in pages.
//!
//! ```text
//! open response
//! ┏━━━━━━━━━━┳━━━━━━━━━━━━━━━━━━━┳━━━━━━━━━━┳━━━━━━━━━━┳━━━━━━━━━┓
//! ┃ CursorId ┃ Header            ┃ RowCount ┃ Rows     ┃ HasMore ┃
//! ┣━━━━━━━━━━╋━━━━━━━━━━━━━━━━━━━╋━━━━━━━━━━╋━━━━━━━━━━╋━━━━━━━━━┫
//! ┃   i64    ┃ sql fields only   ┃   i32    ┃ tagged.. ┃  bool   ┃
//! ┗━━━━━━━━━━┻━━━━━━━━━━━━━━━━━━━┻━━━━━━━━━━┻━━━━━━━━━━┻━━━━━━━━━┛
//! ```
//!
//! Page fetch carries the cursor id and returns `RowCount | Rows | HasMore`.
use bytes::Bytes;
use std::{
    sync::{Arc, atomic::{AtomicUsize, Ordering}},
    time::Duration,
};

use crate::{
    Result,
    codec::DecodeError,
    protocol::RequestBuilder,
    transport::Transport,
};

mod cursor;
mod sql_fields;
mod sql;
mod scan;

pub use cursor::{Cursor, CursorState};
pub use sql_fields::{SqlFieldsQuery, StatementType};
pub use sql::SqlQuery;
pub use scan::ScanQuery;

use cursor::Columns;

/// Cursors dropped while still open.
static LEAKED_CURSORS: AtomicUsize = AtomicUsize::new(0);

/// Number of cursors dropped without being exhausted or closed, process wide.
///
/// Their close is still sent, deferred to the next request on the same transport.
pub fn leaked_cursors() -> usize {
    LEAKED_CURSORS.load(Ordering::Relaxed)
}

/// Entrypoint of the SQL fields query API.
///
/// # Example
///
/// ```no_run
/// # async fn app(mut conn: ignis::Connection) -> ignis::Result<()> {
/// let people: Vec<(i64, String)> = ignis::query::sql_fields("SELECT id, name FROM person WHERE age > ?", &mut conn)
///     .schema("PUBLIC")
///     .bind(21)
///     .fetch_all()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub fn sql_fields<Exe>(sql: impl Into<String>, exe: Exe) -> SqlFieldsQuery<Exe> {
    SqlFieldsQuery::new(sql.into(), exe)
}

/// Entrypoint of the SQL query API, returning cache entries of `table`.
pub fn sql<Exe>(
    cache: impl Into<String>,
    table: impl Into<String>,
    sql: impl Into<String>,
    exe: Exe,
) -> SqlQuery<Exe> {
    SqlQuery::new(cache.into(), table.into(), sql.into(), exe)
}

/// Entrypoint of the scan query API.
pub fn scan<Exe>(cache: impl Into<String>, exe: Exe) -> ScanQuery<Exe> {
    ScanQuery::new(cache.into(), exe)
}

/// Send request of a query over cache entries, whose rows are key and value pairs.
async fn open_entries<IO: Transport>(
    mut io: IO,
    request: RequestBuilder,
    page_op: i16,
) -> Result<Cursor<IO>> {
    let mut payload: Bytes = io.send_and_receive(request).await?.into_payload();
    let id = bytes::Buf::try_get_i64_le(&mut payload).map_err(DecodeError::from)?;
    let columns = Columns { names: Arc::from(["_KEY".to_owned(), "_VAL".to_owned()]), width: 2 };
    Cursor::open(io, id, page_op, Ok(columns), payload).await
}

/// Server side timeout, zero is unlimited.
fn timeout_millis(timeout: Option<Duration>) -> i64 {
    timeout.map_or(0, |t| i64::try_from(t.as_millis()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod test {
    use bytes::{Buf, BufMut, BytesMut};

    use super::*;
    use crate::{
        ErrorKind, Row,
        codec::{self, WireValue},
        protocol::{
            ApplicationError, OP_QUERY_SCAN, OP_QUERY_SCAN_CURSOR_GET_PAGE, OP_QUERY_SQL,
            OP_QUERY_SQL_FIELDS, OP_QUERY_SQL_FIELDS_CURSOR_GET_PAGE,
        },
        test_support::{ScriptedTransport, page},
    };

    /// `cursorId | fieldCount | names | page`
    fn fields_open(id: i64, names: &[&str], page: BytesMut) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_i64_le(id);
        buf.put_i32_le(names.len() as i32);
        for name in names {
            codec::encode(&(*name).into(), true, &mut buf).unwrap();
        }
        buf.put_slice(&page);
        buf
    }

    fn entries_open(id: i64, page: BytesMut) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_i64_le(id);
        buf.put_slice(&page);
        buf
    }

    fn long(n: i64) -> WireValue {
        WireValue::Long(n)
    }

    #[tokio::test]
    async fn cursor_pages_until_exhausted() {
        let mut io = ScriptedTransport::default();
        io.push(fields_open(5, &["ID"], page(&[&[long(1)], &[long(2)]], true)))
            .push(page(&[&[long(3)]], false));

        let mut cursor = sql_fields("SELECT id FROM t", &mut io).cursor().await.unwrap();
        let mut ids = vec![];
        while let Some(row) = cursor.next_row().await.unwrap() {
            ids.push(row.try_get::<_, i64>("id").unwrap());
        }
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(cursor.state(), CursorState::Exhausted);
        assert!(cursor.next_row().await.unwrap().is_none());
        drop(cursor);

        assert_eq!(io.ops(), [OP_QUERY_SQL_FIELDS, OP_QUERY_SQL_FIELDS_CURSOR_GET_PAGE]);
        let mut fetch = io.sent[1].1.clone();
        assert_eq!(fetch.get_i64_le(), 5);
        assert!(io.closed.is_empty());
        assert!(io.deferred.is_empty());
    }

    #[tokio::test]
    async fn dropped_cursor_defers_close_once() {
        let before = leaked_cursors();
        let mut io = ScriptedTransport::default();
        io.push(fields_open(9, &["ID"], page(&[&[long(1)], &[long(2)]], true)));

        let mut cursor = sql_fields("SELECT id FROM t", &mut io).cursor().await.unwrap();
        assert!(cursor.next_row().await.unwrap().is_some());
        drop(cursor);

        assert_eq!(io.deferred, [9]);
        assert!(io.closed.is_empty());
        assert!(leaked_cursors() > before);
    }

    #[tokio::test]
    async fn explicit_close_is_idempotent() {
        let mut io = ScriptedTransport::default();
        io.push(fields_open(4, &["ID"], page(&[&[long(1)]], true)));

        let mut cursor = sql_fields("SELECT id FROM t", &mut io).cursor().await.unwrap();
        cursor.close().await.unwrap();
        cursor.close().await.unwrap();
        assert_eq!(cursor.state(), CursorState::Closed);
        assert!(cursor.next_row().await.unwrap().is_none());
        drop(cursor);

        assert_eq!(io.closed, [4]);
        assert!(io.deferred.is_empty());
    }

    #[tokio::test]
    async fn decode_failure_closes_cursor() {
        let mut io = ScriptedTransport::default();
        let mut bad = BytesMut::new();
        bad.put_i32_le(1);
        // unknown type code
        bad.put_u8(250);
        bad.put_u8(1);
        io.push(fields_open(6, &["ID"], page(&[&[long(1)]], true))).push(bad);

        let mut cursor = sql_fields("SELECT id FROM t", &mut io).cursor().await.unwrap();
        assert!(cursor.next_row().await.unwrap().is_some());
        let err = cursor.next_row().await.unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Decode(DecodeError::UnknownType(250))));
        assert_eq!(cursor.state(), CursorState::Closed);
        drop(cursor);

        assert_eq!(io.closed, [6]);
        assert!(io.deferred.is_empty());
    }

    #[tokio::test]
    async fn truncated_header_closes_cursor() {
        let mut io = ScriptedTransport::default();
        let mut open = BytesMut::new();
        open.put_i64_le(8);
        open.put_i32_le(2);
        codec::encode(&"ID".into(), true, &mut open).unwrap();
        io.push(open);

        let err = sql_fields("SELECT id, name FROM t", &mut io).cursor().await.unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Decode(DecodeError::Truncated { .. })));
        assert_eq!(io.closed, [8]);
    }

    #[tokio::test]
    async fn application_error_on_fetch_closes_cursor() {
        let mut io = ScriptedTransport::default();
        io.push(fields_open(3, &["ID"], page(&[], true))).push_err(ApplicationError {
            op: OP_QUERY_SQL_FIELDS_CURSOR_GET_PAGE,
            correlation_id: 2,
            code: 1,
            message: "cursor gone".into(),
        });

        let mut cursor = sql_fields("SELECT id FROM t", &mut io).cursor().await.unwrap();
        let err = cursor.next_row().await.unwrap_err();
        assert!(!err.is_fatal());
        drop(cursor);
        assert_eq!(io.closed, [3]);
    }

    #[tokio::test]
    async fn fetch_one_closes_cursor() {
        let mut io = ScriptedTransport::default();
        io.push(fields_open(2, &["ID", "NAME"], page(&[&[long(1), "a".into()], &[long(2), "b".into()]], true)));

        let (id, name): (i64, String) = sql_fields("SELECT id, name FROM t", &mut io)
            .fetch_one()
            .await
            .unwrap();
        assert_eq!((id, name.as_str()), (1, "a"));
        assert_eq!(io.closed, [2]);
        assert!(io.deferred.is_empty());
    }

    #[tokio::test]
    async fn fetch_one_of_last_page_skips_close() {
        let mut io = ScriptedTransport::default();
        io.push(fields_open(2, &["ID"], page(&[&[long(1)]], false)));

        let (id,): (i64,) = sql_fields("SELECT id FROM t", &mut io).fetch_one().await.unwrap();
        assert_eq!(id, 1);
        assert!(io.closed.is_empty());
        assert!(io.deferred.is_empty());
    }

    #[tokio::test]
    async fn fetch_one_of_multi_row_last_page_skips_close() {
        let mut io = ScriptedTransport::default();
        io.push(fields_open(2, &["ID"], page(&[&[long(1)], &[long(2)]], false)));

        let (id,): (i64,) = sql_fields("SELECT id FROM t", &mut io).fetch_one().await.unwrap();
        assert_eq!(id, 1);
        assert!(io.closed.is_empty());
        assert!(io.deferred.is_empty());
    }

    #[tokio::test]
    async fn dropping_partly_read_last_page_is_not_a_leak() {
        let mut io = ScriptedTransport::default();
        io.push(fields_open(3, &["ID"], page(&[&[long(1)], &[long(2)]], false)));

        let mut cursor = sql_fields("SELECT id FROM t", &mut io).cursor().await.unwrap();
        assert!(cursor.next_row().await.unwrap().is_some());
        drop(cursor);

        assert!(io.deferred.is_empty());
        assert!(io.closed.is_empty());
    }

    #[tokio::test]
    async fn fetch_one_without_rows() {
        let mut io = ScriptedTransport::default();
        io.push(fields_open(2, &["ID"], page(&[], false)));

        let err = sql_fields("SELECT id FROM t", &mut io).fetch_one::<Row>().await.unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::RowNotFound(_)));
        assert!(io.closed.is_empty());
    }

    #[tokio::test]
    async fn sql_fields_payload() {
        let mut io = ScriptedTransport::default();
        io.push(fields_open(1, &[], page(&[], false)));

        sql_fields("SELECT ?", &mut io)
            .cache("person")
            .page_size(64)
            .bind(7i32)
            .timeout(Duration::from_millis(1500))
            .include_field_names(false)
            .fetch_all::<()>()
            .await
            .unwrap();

        let mut payload = io.sent[0].1.clone();
        assert_eq!(payload.get_i32_le(), crate::hash::cache_id("person"));
        assert_eq!(payload.get_u8(), 0);
        assert_eq!(codec::decode(&mut payload).unwrap(), WireValue::Null);
        assert_eq!(payload.get_i32_le(), 64);
        assert_eq!(payload.get_i32_le(), -1);
        assert_eq!(codec::read_string(&mut payload).unwrap().as_deref(), Some("SELECT ?"));
        assert_eq!(payload.get_i32_le(), 1);
        assert_eq!(codec::decode(&mut payload).unwrap(), WireValue::Int(7));
        assert_eq!(payload.get_u8(), StatementType::Any as u8);
        assert_eq!(&payload[..6], [0; 6]);
        payload.advance(6);
        assert_eq!(payload.get_i64_le(), 1500);
        assert_eq!(payload.get_u8(), 0);
        assert!(payload.is_empty());
    }

    #[tokio::test]
    async fn scan_rows_are_entries() {
        let mut io = ScriptedTransport::default();
        io.push(entries_open(11, page(&[&[long(1), "one".into()]], false)));

        let entries: Vec<(i64, String)> = scan("cache", &mut io).page_size(10).fetch_all().await.unwrap();
        assert_eq!(entries, [(1, "one".to_owned())]);

        assert_eq!(io.ops(), [OP_QUERY_SCAN]);
        let mut payload = io.sent[0].1.clone();
        assert_eq!(payload.get_i32_le(), crate::hash::cache_id("cache"));
        assert_eq!(payload.get_u8(), 0);
        assert_eq!(payload.get_u8(), 101);
        assert_eq!(payload.get_i32_le(), 10);
        assert_eq!(payload.get_i32_le(), -1);
        assert_eq!(payload.get_u8(), 0);
    }

    #[tokio::test]
    async fn scan_fetches_with_scan_page_op() {
        let mut io = ScriptedTransport::default();
        io.push(entries_open(11, page(&[], true)))
            .push(page(&[&[long(1), long(2)]], false));

        let rows: Vec<Row> = scan("cache", &mut io).fetch_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].try_get::<_, i64>("_val").unwrap(), 2);
        assert_eq!(io.ops(), [OP_QUERY_SCAN, OP_QUERY_SCAN_CURSOR_GET_PAGE]);
    }

    #[tokio::test]
    async fn sql_query_payload() {
        let mut io = ScriptedTransport::default();
        io.push(entries_open(1, page(&[], false)));

        sql("person", "Person", "age > ?", &mut io)
            .bind(30i32)
            .local(true)
            .fetch_optional::<Row>()
            .await
            .unwrap();

        assert_eq!(io.ops(), [OP_QUERY_SQL]);
        let mut payload = io.sent[0].1.clone();
        assert_eq!(payload.get_i32_le(), crate::hash::cache_id("person"));
        assert_eq!(payload.get_u8(), 0);
        assert_eq!(codec::read_string(&mut payload).unwrap().as_deref(), Some("Person"));
        assert_eq!(codec::read_string(&mut payload).unwrap().as_deref(), Some("age > ?"));
        assert_eq!(payload.get_i32_le(), 1);
        assert_eq!(codec::decode(&mut payload).unwrap(), WireValue::Int(30));
        assert_eq!([payload.get_u8(), payload.get_u8(), payload.get_u8()], [0, 1, 0]);
        assert_eq!(payload.get_i32_le(), 1024);
        assert_eq!(payload.get_i64_le(), 0);
    }
}
