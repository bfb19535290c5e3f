use crate::Recorder;
use indoc::indoc;
use jsql::{Executor, JSON_CONTENT_TYPE, Placeholders, args};
use std::sync::LazyLock;
use tokio::sync::Mutex;

pub(crate) static FOO: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) const FIVE_AND_NINE: &str =
    "[\n{\"int\":5,\"string\":\"five\"},\n{\"int\":9,\"string\":\"nine\"}\n]";

pub(crate) async fn setup<E: Executor>(executor: &E) {
    executor
        .execute(
            indoc! {"
                DROP TABLE IF EXISTS foo;
                CREATE TABLE foo (i INTEGER, s TEXT);
                INSERT INTO foo (i, s) VALUES (1, 'one'), (5, 'five'), (7, 'seven'), (9, 'nine');
            "}
            .into(),
        )
        .await
        .expect("Failed to create the foo table");
}

pub async fn foo<E: Executor>(executor: &E) {
    let _lock = FOO.lock().await;
    setup(executor).await;

    // Rows
    let query = executor
        .prepare_query(
            "SELECT i AS int, s AS string FROM foo WHERE i > ${first} AND NOT s LIKE ${pat} ORDER BY i",
        )
        .await
        .expect("Failed to prepare the foo query");
    assert_eq!(query.names(), ["first", "pat"]);
    let mut response = Recorder::default();
    let rows = query
        .write_json(&args! { "first" => 3, "pat" => "%eve%" }, &mut response)
        .await
        .expect("Failed to query foo");
    assert_eq!(rows, 2);
    assert_eq!(response.text(), FIVE_AND_NINE);
    assert_eq!(response.headers.0.len(), 1);
    assert_eq!(response.headers.get("content-type"), Some(JSON_CONTENT_TYPE));

    // No rows
    let mut response = Recorder::default();
    let rows = query
        .write_json(&args! { "first" => 100, "pat" => "%eve%" }, &mut response)
        .await
        .expect("Failed to query foo without results");
    assert_eq!(rows, 0);
    assert!(response.body.is_empty());
    assert!(response.headers.0.is_empty());

    // Missing arguments are null, nothing is greater than null
    let json = query
        .to_json(&args! { "pat" => "%eve%" })
        .await
        .expect("Failed to query foo with a missing argument");
    assert_eq!(json, "");

    // Reused
    let (sql, names) = (query.sql().to_string(), query.names().to_vec());
    let json = query
        .to_json(&args! { "first" => 0, "pat" => "%" })
        .await
        .expect("Failed to query foo again");
    assert_eq!(json, "");
    let json = query
        .to_json(&args! { "first" => 0, "pat" => "%x%" })
        .await
        .expect("Failed to query foo again");
    assert_eq!(
        json,
        indoc! {r#"
            [
            {"int":1,"string":"one"},
            {"int":5,"string":"five"},
            {"int":7,"string":"seven"},
            {"int":9,"string":"nine"}
            ]"#}
    );
    let json = query
        .to_json(&args! { "first" => 3, "pat" => "%eve%" })
        .await
        .expect("Failed to query foo again");
    assert_eq!(json, FIVE_AND_NINE);
    assert_eq!(query.sql(), sql);
    assert_eq!(query.names(), names);
    query.close().await.expect("Failed to close the foo query");

    // Repeated placeholder
    let query = executor
        .prepare_query(indoc! {"
            SELECT CAST(${first} AS INTEGER) AS arg, i AS int, s AS string
            FROM foo
            WHERE i > ${first} AND NOT s LIKE ${pat}
            ORDER BY i
        "})
        .await
        .expect("Failed to prepare the foo query with a repeated placeholder");
    let json = query
        .to_json(&args! { "first" => 3, "pat" => "%eve%" })
        .await
        .expect("Failed to query foo with a repeated placeholder");
    assert_eq!(
        json,
        indoc! {r#"
            [
            {"arg":3,"int":5,"string":"five"},
            {"arg":3,"int":9,"string":"nine"}
            ]"#}
    );
}

/// Numbered markers are understood by every backend, whatever its default.
pub async fn foo_numbered<E: Executor>(executor: &E) {
    let _lock = FOO.lock().await;
    setup(executor).await;
    let query = executor
        .prepare_query_with(
            "SELECT ${first} + 0 AS arg, i AS int FROM foo WHERE i > ${first} AND i < ${last} ORDER BY i",
            Placeholders::Numbered,
        )
        .await
        .expect("Failed to prepare the numbered foo query");
    assert_eq!(
        query.sql(),
        "SELECT $1 + 0 AS arg, i AS int FROM foo WHERE i > $1 AND i < $2 ORDER BY i"
    );
    let json = query
        .to_json(&args! { "first" => 1, "last" => 9 })
        .await
        .expect("Failed to query the numbered foo");
    assert_eq!(
        json,
        "[\n{\"arg\":1,\"int\":5},\n{\"arg\":1,\"int\":7}\n]"
    );
}

pub async fn preparation_failure<E: Executor>(executor: &E) {
    let error;
    crate::silent_logs! {
        error = executor
            .prepare_query("SELEC i FROM foo WHERE i > ${first}")
            .await
            .expect_err("Preparing an invalid query must fail");
    }
    let message = format!("{:#}", error);
    assert!(
        message.starts_with("While preparing the query:"),
        "Unexpected error: {}",
        message
    );
}
