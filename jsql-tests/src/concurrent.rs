use crate::foo::{FIVE_AND_NINE, FOO, setup};
use jsql::{Executor, args};

pub async fn concurrent<E: Executor>(executor: &E) {
    let _lock = FOO.lock().await;
    setup(executor).await;
    let query = executor
        .prepare_query("SELECT i AS int FROM foo WHERE i > ${first} ORDER BY i")
        .await
        .expect("Failed to prepare the concurrent query");
    let other = executor
        .prepare_query(
            "SELECT i AS int, s AS string FROM foo WHERE i > ${first} AND NOT s LIKE ${pat} ORDER BY i",
        )
        .await
        .expect("Failed to prepare the other concurrent query");
    let (all, some, none, pattern) = (
        args! { "first" => 0 },
        args! { "first" => 6 },
        args! { "first" => 9 },
        args! { "first" => 3, "pat" => "%eve%" },
    );
    let (all, some, none, pattern) = tokio::join!(
        query.to_json(&all),
        query.to_json(&some),
        query.to_json(&none),
        other.to_json(&pattern),
    );
    assert_eq!(
        all.expect("Failed to query all the rows"),
        "[\n{\"int\":1},\n{\"int\":5},\n{\"int\":7},\n{\"int\":9}\n]"
    );
    assert_eq!(
        some.expect("Failed to query some rows"),
        "[\n{\"int\":7},\n{\"int\":9}\n]"
    );
    assert_eq!(none.expect("Failed to query no rows"), "");
    assert_eq!(pattern.expect("Failed to query the pattern"), FIVE_AND_NINE);
}
