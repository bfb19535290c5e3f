use crate::{
    Args, Context, Driver, Executor, Placeholders, Prepared, Result, Rewritten, Sink,
    StreamError, Template, Value, render_template, rewrite, truncate_long, write_json,
};
use std::fmt::{self, Debug, Display};
use tokio::io::AsyncWrite;

/// A query written with named `${placeholders}`, rewritten and prepared once.
///
/// Invocations only borrow it: the same value can be executed again and again,
/// also concurrently, with different arguments. Release it with
/// [`PreparedQuery::close`] (or by dropping it) once it is no longer needed.
///
/// ```rust,ignore
/// let query = connection
///     .prepare_query("SELECT i AS int, s AS string FROM foo WHERE i > ${first}")
///     .await?;
/// let mut out = Vec::new();
/// let rows = query.write_json(&args! { "first" => 3 }, &mut out).await?;
/// ```
pub struct PreparedQuery<P: Prepared> {
    rewritten: Rewritten,
    placeholders: Placeholders,
    statement: P,
}

impl<P: Prepared> PreparedQuery<P> {
    /// Prepare `query` with the positional syntax of the executor's driver.
    pub async fn new<E>(executor: &E, query: &str) -> Result<Self>
    where
        E: Executor,
        E::Driver: Driver<Prepared = P>,
    {
        Self::with_placeholders(executor, query, <E::Driver as Driver>::PLACEHOLDERS).await
    }

    pub async fn with_placeholders<E>(
        executor: &E,
        query: &str,
        placeholders: Placeholders,
    ) -> Result<Self>
    where
        E: Executor,
        E::Driver: Driver<Prepared = P>,
    {
        let rewritten = rewrite(query, placeholders);
        log::debug!(
            "Preparing the query rewritten for {}:\n{}",
            <E::Driver as Driver>::NAME,
            truncate_long!(rewritten.sql)
        );
        let statement = executor
            .prepare(rewritten.sql.clone())
            .await
            .with_context(|| format!("While preparing the query:\n{}", truncate_long!(query)))?;
        Ok(Self {
            rewritten,
            placeholders,
            statement,
        })
    }

    /// Query text in the driver syntax.
    pub fn sql(&self) -> &str {
        &self.rewritten.sql
    }
    /// Argument name of each positional parameter.
    pub fn names(&self) -> &[String] {
        &self.rewritten.names
    }
    pub fn params(&self, args: &Args) -> Vec<Value> {
        args.positional(&self.rewritten.names)
    }

    /// Execute with `args` and stream the rows into `sink` as a JSON array of objects.
    ///
    /// Returns the number of rows written. When zero rows come out nothing at all
    /// is written, not even the brackets, and the sink headers are left untouched.
    pub async fn write_json<S: Sink + ?Sized>(
        &self,
        args: &Args,
        sink: &mut S,
    ) -> Result<usize, StreamError> {
        let cursor = self
            .statement
            .query(self.params(args))
            .await
            .map_err(StreamError::clean)?;
        write_json(cursor, sink).await
    }

    /// Execute with `args` and return the JSON text, empty when there are no rows.
    pub async fn to_json(&self, args: &Args) -> Result<String> {
        let mut out = Vec::new();
        self.write_json(args, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    /// Execute with `args` and render `template` with the rows while they are fetched.
    pub async fn render<T, W>(&self, args: &Args, template: &T, out: &mut W) -> Result<()>
    where
        T: Template + ?Sized,
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let cursor = self.statement.query(self.params(args)).await?;
        render_template(cursor, args, template, out).await
    }

    /// Release the statement.
    pub async fn close(self) -> Result<()> {
        self.statement.close().await
    }
}

impl<P: Prepared> Debug for PreparedQuery<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedQuery")
            .field("sql", &self.rewritten.sql)
            .field("names", &self.rewritten.names)
            .field("placeholders", &self.placeholders)
            .finish_non_exhaustive()
    }
}

impl<P: Prepared> Display for PreparedQuery<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.rewritten.sql))
    }
}
