use crate::{
    ValueHolder, postgres_type_to_value,
    util::{column_labels, row_to_values},
};
use futures::{StreamExt, TryStreamExt};
use jsql_core::{Context, Cursor, Error, Prepared, Result, RowNames, Value, truncate_long};
use std::{
    fmt::{self, Display},
    sync::Arc,
};
use tokio_postgres::{Client, Statement};

/// A server side prepared statement.
///
/// The client pipelines requests, invocations of the same statement run
/// concurrently without waiting for each other.
pub struct PostgresPrepared {
    pub(crate) client: Arc<Client>,
    pub(crate) statement: Statement,
    pub(crate) labels: RowNames,
    pub(crate) sql: String,
}

impl PostgresPrepared {
    pub(crate) fn new(client: Arc<Client>, statement: Statement, sql: String) -> Self {
        let labels = column_labels(statement.columns());
        Self {
            client,
            statement,
            labels,
            sql,
        }
    }

    /// Converts each argument into the type the server inferred for its parameter.
    fn coerce(&self, params: Vec<Value>) -> Result<Vec<ValueHolder>> {
        let types = self.statement.params();
        if params.len() != types.len() {
            return Err(Error::msg(format!(
                "The query expects {} parameters, {} were provided",
                types.len(),
                params.len()
            )));
        }
        params
            .into_iter()
            .zip(types)
            .enumerate()
            .map(|(i, (value, ty))| {
                value
                    .try_as(&postgres_type_to_value(ty))
                    .map(ValueHolder)
                    .with_context(|| format!("While binding parameter ${} as {}", i + 1, ty))
            })
            .collect()
    }
}

impl Prepared for PostgresPrepared {
    async fn query(&self, params: Vec<Value>) -> Result<Cursor<'_>> {
        let context = || format!("While running the query:\n{}", truncate_long!(self.sql));
        let rows = async {
            let params = self.coerce(params)?;
            Ok::<_, Error>(self.client.query_raw(&self.statement, params).await?)
        }
        .await
        .with_context(context)
        .map_err(|e| {
            log::error!("{:#}", e);
            e
        })?;
        Ok(Cursor::new(
            self.labels.clone(),
            rows.map_err(|e| {
                let e = Error::new(e);
                log::error!("{:#}", e);
                e
            })
            .map(|row| row.and_then(row_to_values)),
        ))
    }
}

impl Display for PostgresPrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))
    }
}
