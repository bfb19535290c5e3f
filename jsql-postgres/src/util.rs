use crate::ValueHolder;
use jsql_core::{Error, Result, Row, RowNames};
use tokio_postgres::Column;

pub(crate) fn column_labels(columns: &[Column]) -> RowNames {
    columns.iter().map(|c| c.name().to_string()).collect()
}

pub(crate) fn row_to_values(row: tokio_postgres::Row) -> Result<Row> {
    (0..row.len())
        .map(|i| match row.try_get::<_, ValueHolder>(i) {
            Ok(v) => Ok(v.0),
            Err(e) => {
                let col = &row.columns()[i];
                Err(Error::new(e).context(format!(
                    "Could not deserialize column {} `{}`: {}",
                    i,
                    col.name(),
                    col.type_()
                )))
            }
        })
        .collect()
}
