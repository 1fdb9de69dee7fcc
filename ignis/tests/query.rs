use bytes::Buf;
use ignis::{
    ErrorKind, Row, WireValue,
    protocol::{OP_QUERY_SQL_FIELDS, OP_QUERY_SQL_FIELDS_CURSOR_GET_PAGE, OP_RESOURCE_CLOSE},
    query::{self, CursorState},
};

mod common;

use common::{fields_cursor, page};

#[tokio::test]
async fn paging_through_connection() {
    let (mut conn, mut server) = common::connect().await;

    let client = async {
        let mut cursor = query::sql_fields("SELECT id, name FROM person", &mut conn)
            .page_size(2)
            .cursor()
            .await
            .unwrap();

        let mut rows = vec![];
        while let Some(row) = cursor.next_row().await.unwrap() {
            rows.push(row.decode::<(i64, String)>().unwrap());
        }
        assert_eq!(cursor.state(), CursorState::Exhausted);
        rows
    };

    let server = async {
        let open = server
            .respond(&fields_cursor(
                1,
                &["ID", "NAME"],
                page(&[&[1i64.into(), "a".into()], &[2i64.into(), "b".into()]], true),
            ))
            .await;
        let fetch = server.respond(&page(&[&[3i64.into(), "c".into()]], false)).await;
        (open, fetch)
    };

    let (rows, (open, mut fetch)) = tokio::join!(client, server);
    assert_eq!(rows, [(1, "a".to_owned()), (2, "b".to_owned()), (3, "c".to_owned())]);
    assert_eq!(open.op, OP_QUERY_SQL_FIELDS);
    assert_eq!(fetch.op, OP_QUERY_SQL_FIELDS_CURSOR_GET_PAGE);
    assert_eq!(fetch.payload.get_i64_le(), 1);
    assert_ne!(open.correlation_id, fetch.correlation_id);
}

#[tokio::test]
async fn server_error_keeps_connection_usable() {
    let (mut conn, mut server) = common::connect().await;

    let (result, _) = tokio::join!(
        query::sql_fields("SELECT * FROM missing", &mut conn).fetch_all::<Row>(),
        server.fail(7, "boom"),
    );
    let err = result.unwrap_err();
    assert!(!err.is_fatal());
    let ErrorKind::Application(app) = err.kind() else {
        panic!("expected application error, found {err:?}");
    };
    assert_eq!((app.code(), app.message()), (7, "boom"));
    assert!(!conn.is_broken());

    let reply = fields_cursor(2, &["1"], page(&[&[WireValue::Int(1)]], false));
    let (result, _) = tokio::join!(
        query::sql_fields("SELECT 1", &mut conn).fetch_one::<(i32,)>(),
        server.respond(&reply),
    );
    assert_eq!(result.unwrap(), (1,));
}

#[tokio::test]
async fn dropped_cursor_is_closed_before_next_request() {
    let (mut conn, mut server) = common::connect().await;
    let before = query::leaked_cursors();

    let reply = fields_cursor(9, &["ID"], page(&[&[1i64.into()]], true));
    let (cursor, _) = tokio::join!(
        query::sql_fields("SELECT id FROM person", &mut conn).cursor(),
        server.respond(&reply),
    );
    drop(cursor.unwrap());
    assert!(query::leaked_cursors() > before);

    let client = query::sql_fields("SELECT id FROM person", &mut conn).fetch_optional::<Row>();
    let server = async {
        let mut close = server.respond(&[]).await;
        let open = server.respond(&fields_cursor(10, &["ID"], page(&[], false))).await;
        (close.op, close.payload.get_i64_le(), open.op)
    };

    let (row, ops) = tokio::join!(client, server);
    assert!(row.unwrap().is_none());
    assert_eq!(ops, (OP_RESOURCE_CLOSE, 9, OP_QUERY_SQL_FIELDS));
}
