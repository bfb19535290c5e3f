#[cfg(test)]
mod tests {
    use jsql_core::{Connection, Executor, args};
    use jsql_sqlite::SqliteConnection;
    use jsql_tests::{init_logs, silent_logs};
    use std::{path::Path, sync::Mutex};
    use tokio::fs;

    static MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn create_database() {
        init_logs();
        const DB_PATH: &'static str = "../target/debug/creation.sqlite";
        let _guard = MUTEX.lock().unwrap();
        if Path::new(DB_PATH).exists() {
            fs::remove_file(DB_PATH)
                .await
                .expect(format!("Failed to remove test database file {}", DB_PATH).as_str());
        }
        assert!(
            !Path::new(DB_PATH).exists(),
            "Database file should not exist before test"
        );
        SqliteConnection::connect(format!("sqlite://{}?mode=rwc", DB_PATH).into())
            .await
            .expect("Could not open the database");
        assert!(
            Path::new(DB_PATH).exists(),
            "Database file should be created after connection"
        );
        SqliteConnection::connect(format!("sqlite://{}?mode=ro", DB_PATH).into())
            .await
            .expect("Could not open the database");
        fs::remove_file(DB_PATH)
            .await
            .expect(format!("Failed to remove existing test database file {}", DB_PATH).as_str());
        silent_logs! {
            assert!(
                SqliteConnection::connect(format!("sqlite://{}?mode=ro", DB_PATH).into())
                    .await
                    .is_err(),
                "Should not be able to open in read only unexisting database"
            );
        }
    }

    #[tokio::test]
    async fn wrong_url() {
        silent_logs! {
            assert!(
                SqliteConnection::connect("postgres://some_value".into())
                    .await
                    .is_err()
            );
        };
    }

    #[tokio::test]
    async fn multiple_statements() {
        let connection = SqliteConnection::connect("sqlite://:memory:".into())
            .await
            .expect("Could not open the in memory database");
        silent_logs! {
            assert!(
                connection
                    .prepare_query("SELECT 1; SELECT 2")
                    .await
                    .is_err(),
                "Only one statement can be prepared at a time"
            );
            assert!(
                connection.prepare_query("  -- nothing\n").await.is_err(),
                "A query without statements cannot be prepared"
            );
        }
        let query = connection
            .prepare_query("SELECT ${a} AS a; -- trailing comment\n")
            .await
            .expect("A trailing semicolon and comment are accepted");
        assert_eq!(
            query.to_json(&args! { "a" => "x" }).await.unwrap(),
            "[\n{\"a\":\"x\"}\n]"
        );
    }

    #[tokio::test]
    async fn cursor_failure() {
        let connection = SqliteConnection::connect("sqlite://:memory:".into())
            .await
            .expect("Could not open the in memory database");
        let query = connection
            .prepare_query(
                "SELECT abs(x) AS value FROM (SELECT 1 AS x UNION ALL SELECT ${min})",
            )
            .await
            .expect("Failed to prepare the query");
        let mut out = Vec::new();
        let error;
        silent_logs! {
            error = query
                .write_json(&args! { "min" => i64::MIN }, &mut out)
                .await
                .expect_err("abs of the smallest integer overflows");
        }
        assert!(!error.is_clean());
        assert_eq!(error.rows(), 1);
        assert!(error.to_string().contains("integer overflow"), "{}", error);
        assert_eq!(String::from_utf8(out).unwrap(), "[\n{\"value\":1}\n]");

        // The statement is reset and usable again
        assert_eq!(
            query.to_json(&args! { "min" => -4 }).await.unwrap(),
            "[\n{\"value\":1},\n{\"value\":4}\n]"
        );
    }

    #[tokio::test]
    async fn blobs_as_text() {
        let connection = SqliteConnection::connect("sqlite://:memory:".into())
            .await
            .expect("Could not open the in memory database");
        let query = connection
            .prepare_query("SELECT CAST(${s} AS BLOB) AS data, ${n} AS missing, 2.5 AS real")
            .await
            .expect("Failed to prepare the query");
        assert_eq!(
            query.to_json(&args! { "s" => "seven" }).await.unwrap(),
            "[\n{\"data\":\"seven\",\"missing\":null,\"real\":2.5}\n]"
        );
    }
}
