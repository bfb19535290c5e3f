use crate::{Driver, Placeholders, PreparedQuery, Result};
use std::future::Future;

pub trait Executor: Send + Sync {
    type Driver: Driver;

    fn driver(&self) -> &Self::Driver;

    /// Compile `sql`, already written in the driver positional syntax, into a reusable statement.
    fn prepare(
        &self,
        sql: String,
    ) -> impl Future<Output = Result<<Self::Driver as Driver>::Prepared>> + Send;

    /// Run raw SQL, possibly made of multiple statements, discarding any row.
    fn execute(&self, sql: String) -> impl Future<Output = Result<()>> + Send;

    /// Rewrite the named placeholders of `query` in the driver syntax and prepare it.
    fn prepare_query(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<PreparedQuery<<Self::Driver as Driver>::Prepared>>> + Send
    where
        Self: Sized,
    {
        PreparedQuery::new(self, query)
    }

    /// Like [`Executor::prepare_query`] with an explicit positional syntax.
    fn prepare_query_with(
        &self,
        query: &str,
        placeholders: Placeholders,
    ) -> impl Future<Output = Result<PreparedQuery<<Self::Driver as Driver>::Prepared>>> + Send
    where
        Self: Sized,
    {
        PreparedQuery::with_placeholders(self, query, placeholders)
    }
}
