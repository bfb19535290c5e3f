mod common;

#[cfg(test)]
mod tests {
    use crate::common::{MockConnection, Recorder, Step, foo_rows};
    use indoc::indoc;
    use jsql_core::{Executor, JSON_CONTENT_TYPE, Placeholders, Result, StreamError, Value, args};
    use std::sync::atomic::Ordering;

    const QUERY: &str =
        "SELECT i AS int, s AS string FROM foo WHERE i > ${first} AND s LIKE ${pat}";

    #[tokio::test]
    async fn rows_as_json_array() {
        let connection = MockConnection::new(&["int", "string"], foo_rows()[1..].to_vec());
        let query = connection.prepare_query(QUERY).await.unwrap();
        assert_eq!(
            query.sql(),
            "SELECT i AS int, s AS string FROM foo WHERE i > $1 AND s LIKE $2"
        );
        let mut sink = Recorder::default();
        let rows = query
            .write_json(&args! { "first" => 3, "pat" => "%" }, &mut sink)
            .await
            .unwrap();
        assert_eq!(rows, 3);
        assert_eq!(
            sink.text(),
            indoc! {r#"
                [
                {"int":5,"string":"five"},
                {"int":7,"string":"seven"},
                {"int":9,"string":"nine"}
                ]"#}
        );
        assert_eq!(
            sink.headers.0,
            [("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string())]
        );
        assert_eq!(
            *connection.executions.lock().unwrap(),
            [vec![Value::Int32(Some(3)), Value::Varchar(Some("%".into()))]]
        );
    }

    #[tokio::test]
    async fn single_row() {
        let connection = MockConnection::new(&["int"], vec![vec![Value::Int64(Some(1))]]);
        let query = connection.prepare_query("SELECT 1 AS int").await.unwrap();
        assert_eq!(query.to_json(&args! {}).await.unwrap(), "[\n{\"int\":1}\n]");
    }

    #[tokio::test]
    async fn no_rows_no_output() {
        let connection = MockConnection::new(&["int", "string"], vec![]);
        let query = connection.prepare_query(QUERY).await.unwrap();
        let mut sink = Recorder::default();
        let rows = query
            .write_json(&args! { "first" => 100, "pat" => "%" }, &mut sink)
            .await
            .unwrap();
        assert_eq!(rows, 0);
        assert!(sink.body.is_empty());
        assert!(sink.headers.0.is_empty(), "No header without rows");
    }

    #[tokio::test]
    async fn missing_arguments_are_null() {
        let connection = MockConnection::new(&["int", "string"], vec![]);
        let query = connection
            .prepare_query_with(QUERY, Placeholders::Unnumbered)
            .await
            .unwrap();
        assert_eq!(query.names(), ["first", "pat"]);
        query.to_json(&args! { "pat" => "%" }).await.unwrap();
        assert_eq!(
            *connection.executions.lock().unwrap(),
            [vec![Value::Null, Value::Varchar(Some("%".into()))]]
        );
    }

    #[tokio::test]
    async fn failure_after_rows_closes_the_array() {
        let mut connection = MockConnection::new(&["int", "string"], foo_rows());
        connection.steps.insert(2, Step::Fail("connection reset"));
        let query = connection.prepare_query(QUERY).await.unwrap();
        let mut sink = Recorder::default();
        let error = query
            .write_json(&args! { "first" => 0, "pat" => "%" }, &mut sink)
            .await
            .unwrap_err();
        assert!(!error.is_clean());
        assert_eq!(error.rows(), 2);
        assert_eq!(error.to_string(), "connection reset");
        assert_eq!(
            sink.text(),
            "[\n{\"int\":1,\"string\":\"one\"},\n{\"int\":5,\"string\":\"five\"}\n]"
        );
        assert_eq!(sink.headers.0.len(), 1);
        assert_eq!(
            connection.fetched.load(Ordering::SeqCst),
            3,
            "The cursor is not polled after a failure"
        );
    }

    #[tokio::test]
    async fn failure_before_rows_writes_nothing() {
        let mut connection = MockConnection::new(&["int"], vec![]);
        connection.steps.push(Step::Fail("integer overflow"));
        let query = connection.prepare_query("SELECT 1 AS int").await.unwrap();
        let mut sink = Recorder::default();
        let result: Result<usize, StreamError> = query.write_json(&args! {}, &mut sink).await;
        let error = result.unwrap_err();
        assert!(error.is_clean());
        assert_eq!(error.rows(), 0);
        assert!(sink.body.is_empty());
        assert!(sink.headers.0.is_empty());
    }

    #[tokio::test]
    async fn execution_failure_is_clean() {
        let connection = MockConnection {
            reject_query: true,
            ..MockConnection::new(&["int"], foo_rows())
        };
        let query = connection.prepare_query("SELECT 1 AS int").await.unwrap();
        let mut sink = Recorder::default();
        let error = query.write_json(&args! {}, &mut sink).await.unwrap_err();
        assert!(error.is_clean());
        assert!(sink.body.is_empty());
        assert_eq!(connection.fetched.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unrepresentable_value() {
        let connection = MockConnection::new(
            &["value"],
            vec![
                vec![Value::Float64(Some(0.5))],
                vec![Value::Float64(Some(f64::INFINITY))],
            ],
        );
        let query = connection.prepare_query("SELECT v AS value").await.unwrap();
        let mut out = Vec::new();
        let error = query.write_json(&args! {}, &mut out).await.unwrap_err();
        assert_eq!(error.rows(), 1);
        assert_eq!(String::from_utf8(out).unwrap(), "[\n{\"value\":0.5}\n]");
    }

    #[tokio::test]
    async fn blobs_are_written_as_text() {
        let connection = MockConnection::new(
            &["data"],
            vec![vec![Value::Blob(Some(b"seven".to_vec().into()))]],
        );
        let query = connection.prepare_query("SELECT d AS data").await.unwrap();
        assert_eq!(
            query.to_json(&args! {}).await.unwrap(),
            "[\n{\"data\":\"seven\"}\n]"
        );
    }

    #[tokio::test]
    async fn preparation_failure() {
        let connection = MockConnection {
            reject_prepare: true,
            ..Default::default()
        };
        let error = connection.prepare_query(QUERY).await.unwrap_err();
        let message = format!("{error:#}");
        assert!(message.starts_with("While preparing the query:"), "{message}");
        assert!(message.contains("syntax error"), "{message}");
    }

    #[tokio::test]
    async fn reused_across_invocations() {
        let connection = MockConnection::new(&["int", "string"], foo_rows());
        let query = connection.prepare_query(QUERY).await.unwrap();
        let (sql, names) = (query.sql().to_string(), query.names().to_vec());
        for i in 0..3 {
            let (low, high) = (
                args! { "first" => i, "pat" => "%" },
                args! { "first" => i + 10, "pat" => "%" },
            );
            let (first, second) = tokio::join!(query.to_json(&low), query.to_json(&high));
            assert_eq!(first.unwrap(), second.unwrap());
        }
        assert_eq!(query.sql(), sql);
        assert_eq!(query.names(), names);
        assert_eq!(connection.executions.lock().unwrap().len(), 6);
        query.close().await.unwrap();
    }
}
