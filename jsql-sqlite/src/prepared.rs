use crate::{CBox, error_message_from_ptr, extract::extract_row};
use async_stream::try_stream;
use jsql_core::{Context, Cursor, Error, Prepared, Result, Row, RowNames, Value, truncate_long};
use libsqlite3_sys::*;
use rust_decimal::prelude::ToPrimitive;
use std::{
    ffi::c_int,
    fmt::{self, Display},
    os::raw::{c_char, c_void},
    sync::Arc,
};
use tokio::sync::{Mutex, MutexGuard};

/// A compiled sqlite statement.
///
/// A statement has a single execution state, concurrent invocations take turns:
/// each one holds the statement from binding until its cursor is dropped.
pub struct SqlitePrepared {
    statement: Mutex<CBox<*mut sqlite3_stmt>>,
    labels: RowNames,
    sql: String,
    _connection: Arc<CBox<*mut sqlite3>>,
}

impl SqlitePrepared {
    pub(crate) fn new(
        statement: CBox<*mut sqlite3_stmt>,
        labels: RowNames,
        sql: String,
        connection: Arc<CBox<*mut sqlite3>>,
    ) -> Self {
        Self {
            statement: Mutex::new(statement),
            labels,
            sql,
            _connection: connection,
        }
    }
    pub fn labels(&self) -> &RowNames {
        &self.labels
    }
}

/// Exclusive use of the statement for one invocation, reset when dropped.
struct Execution<'s> {
    statement: MutexGuard<'s, CBox<*mut sqlite3_stmt>>,
    columns: c_int,
}

impl Execution<'_> {
    fn step(&mut self) -> Result<Option<Row>> {
        let statement = **self.statement;
        unsafe {
            match sqlite3_step(statement) {
                SQLITE_DONE => Ok(None),
                SQLITE_ROW => extract_row(statement, self.columns).map(Some),
                _ => {
                    let error = Error::msg(
                        error_message_from_ptr(&sqlite3_errmsg(sqlite3_db_handle(statement)))
                            .to_string(),
                    );
                    log::error!("{:#}", error);
                    Err(error)
                }
            }
        }
    }
}

impl Drop for Execution<'_> {
    fn drop(&mut self) {
        unsafe {
            sqlite3_reset(**self.statement);
            sqlite3_clear_bindings(**self.statement);
        }
    }
}

fn bind_text(statement: *mut sqlite3_stmt, index: c_int, v: &str) -> c_int {
    unsafe {
        sqlite3_bind_text(
            statement,
            index,
            v.as_ptr() as *const c_char,
            v.len() as c_int,
            SQLITE_TRANSIENT(),
        )
    }
}

pub(crate) fn bind_value(statement: *mut sqlite3_stmt, index: c_int, value: &Value) -> Result<()> {
    unsafe {
        let rc = match value {
            v if v.is_null() => sqlite3_bind_null(statement, index),
            Value::Boolean(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::Int8(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::Int16(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::Int32(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::Int64(Some(v)) => sqlite3_bind_int64(statement, index, *v),
            Value::UInt8(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::UInt16(Some(v)) => sqlite3_bind_int(statement, index, *v as c_int),
            Value::UInt32(Some(v)) => sqlite3_bind_int64(statement, index, *v as sqlite3_int64),
            Value::UInt64(Some(v)) => {
                let Ok(v) = sqlite3_int64::try_from(*v) else {
                    return Err(Error::msg(format!(
                        "Cannot bind u64 value `{}` into sqlite integer because it's out of bounds",
                        v
                    )));
                };
                sqlite3_bind_int64(statement, index, v)
            }
            Value::Float32(Some(v)) => sqlite3_bind_double(statement, index, *v as f64),
            Value::Float64(Some(v)) => sqlite3_bind_double(statement, index, *v),
            Value::Decimal(Some(v)) => sqlite3_bind_double(
                statement,
                index,
                v.to_f64().ok_or_else(|| {
                    Error::msg(format!("Cannot convert the Decimal value `{}` to f64", v))
                })?,
            ),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => bind_text(statement, index, v),
            Value::Blob(Some(v)) => sqlite3_bind_blob(
                statement,
                index,
                v.as_ptr() as *const c_void,
                v.len() as c_int,
                SQLITE_TRANSIENT(),
            ),
            Value::Date(Some(v)) => bind_text(statement, index, &v.to_string()),
            Value::Time(Some(v)) => bind_text(statement, index, &v.to_string()),
            Value::Timestamp(Some(v)) => bind_text(statement, index, &v.to_string()),
            Value::TimestampWithTimezone(Some(v)) => bind_text(statement, index, &v.to_string()),
            Value::Uuid(Some(v)) => bind_text(statement, index, &v.to_string()),
            _ => {
                return Err(Error::msg(format!(
                    "Cannot use a {:?} as a query parameter",
                    value
                )));
            }
        };
        if rc != SQLITE_OK {
            return Err(Error::msg(
                error_message_from_ptr(&sqlite3_errmsg(sqlite3_db_handle(statement))).to_string(),
            )
            .context(format!("Cannot bind parameter {}", index)));
        }
        Ok(())
    }
}

impl Prepared for SqlitePrepared {
    async fn query(&self, params: Vec<Value>) -> Result<Cursor<'_>> {
        let mut execution = Execution {
            statement: self.statement.lock().await,
            columns: self.labels.len() as c_int,
        };
        for (i, value) in params.iter().enumerate() {
            if let Err(error) = bind_value(**execution.statement, i as c_int + 1, value)
                .with_context(|| format!("While running the query:\n{}", truncate_long!(self.sql)))
            {
                log::error!("{:#}", error);
                return Err(error);
            }
        }
        Ok(Cursor::new(
            self.labels.clone(),
            try_stream! {
                while let Some(row) = execution.step()? {
                    yield row;
                }
            },
        ))
    }
}

impl Display for SqlitePrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))
    }
}
