use crate::{Cursor, Result, Value};
use std::{fmt::Display, future::Future};

/// A backend prepared statement.
///
/// Executions only borrow the statement, so the same handle serves repeated
/// and concurrent invocations. Drivers that cannot execute a statement
/// concurrently serialize the executions internally.
pub trait Prepared: Send + Sync + Display {
    /// Execute the statement binding `params` positionally (the first value is
    /// parameter 1) and return the cursor over its rows.
    fn query(&self, params: Vec<Value>) -> impl Future<Output = Result<Cursor<'_>>> + Send;

    /// Release the statement. Dropping it has the same effect, without reporting errors.
    fn close(self) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized,
    {
        async move {
            drop(self);
            Ok(())
        }
    }
}
