use crate::{
    CBox, SqliteDriver, SqlitePrepared, error_message_from_ptr, extract::extract_name,
};
use jsql_core::{Connection, Context, Driver, Error, Executor, Result, truncate_long};
use libsqlite3_sys::{
    SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_FULLMUTEX, SQLITE_OPEN_READWRITE, SQLITE_OPEN_URI,
    sqlite3, sqlite3_busy_timeout, sqlite3_close, sqlite3_column_count, sqlite3_errmsg,
    sqlite3_exec, sqlite3_finalize, sqlite3_free, sqlite3_open_v2, sqlite3_prepare_v2,
    sqlite3_stmt,
};
use std::{
    borrow::Cow,
    ffi::{CString, c_char, c_int},
    ptr,
    sync::Arc,
};
use tokio::task::spawn_blocking;

/// Milliseconds a statement waits on a locked database before failing.
const BUSY_TIMEOUT: c_int = 5000;

pub struct SqliteConnection {
    pub(crate) connection: Arc<CBox<*mut sqlite3>>,
}

fn compile(
    connection: *mut sqlite3,
    sql: *const c_char,
    tail: &mut *const c_char,
) -> Result<CBox<*mut sqlite3_stmt>> {
    unsafe {
        let mut statement = CBox::new(ptr::null_mut(), |p| {
            sqlite3_finalize(p);
        });
        let rc = sqlite3_prepare_v2(connection, sql, -1, &mut *statement, tail);
        if rc != SQLITE_OK {
            return Err(Error::msg(
                error_message_from_ptr(&sqlite3_errmsg(connection)).to_string(),
            ));
        }
        Ok(statement)
    }
}

impl Executor for SqliteConnection {
    type Driver = SqliteDriver;

    fn driver(&self) -> &Self::Driver {
        &SqliteDriver {}
    }

    async fn prepare(&self, sql: String) -> Result<SqlitePrepared> {
        let connection = self.connection.clone();
        let prepared = spawn_blocking(move || -> Result<SqlitePrepared> {
            let source = CString::new(sql.as_bytes())
                .context("Could not create a CString from the query String")?;
            let mut tail = ptr::null();
            let statement = compile(**connection, source.as_ptr(), &mut tail)?;
            if statement.is_null() {
                return Err(Error::msg("The query does not contain any statement"));
            }
            // Whatever follows the first statement must compile to nothing
            let mut rest = ptr::null();
            if !tail.is_null() && !compile(**connection, tail, &mut rest)?.is_null() {
                return Err(Error::msg(
                    "Cannot prepare more than one statement at a time",
                ));
            }
            let count = unsafe { sqlite3_column_count(*statement) };
            let labels = (0..count)
                .map(|i| extract_name(*statement, i))
                .collect::<Result<_>>()?;
            Ok(SqlitePrepared::new(statement, labels, sql, connection))
        })
        .await?;
        if let Err(error) = &prepared {
            log::error!("{:#}", error);
        }
        prepared
    }

    async fn execute(&self, sql: String) -> Result<()> {
        let connection = self.connection.clone();
        let context = format!("While executing the query:\n{}", truncate_long!(sql));
        let result = spawn_blocking(move || -> Result<()> {
            let source = CString::new(sql.as_bytes())
                .context("Could not create a CString from the query String")?;
            let mut message: *mut c_char = ptr::null_mut();
            unsafe {
                let rc = sqlite3_exec(
                    **connection,
                    source.as_ptr(),
                    None,
                    ptr::null_mut(),
                    &mut message,
                );
                if rc == SQLITE_OK {
                    return Ok(());
                }
                if message.is_null() {
                    return Err(Error::msg(
                        error_message_from_ptr(&sqlite3_errmsg(**connection)).to_string(),
                    ));
                }
                let error = Error::msg(error_message_from_ptr(&message.cast_const()).to_string());
                sqlite3_free(message.cast());
                Err(error)
            }
        })
        .await?
        .context(context);
        if let Err(error) = &result {
            log::error!("{:#}", error);
        }
        result
    }
}

impl Connection for SqliteConnection {
    /// Opens `sqlite://<path>`, where the path may carry sqlite URI parameters
    /// (`?mode=ro`, `?cache=shared`) and `:memory:` is an in memory database.
    async fn connect(url: Cow<'static, str>) -> Result<SqliteConnection> {
        let prefix = format!("{}://", <Self::Driver as Driver>::NAME);
        if !url.starts_with(&prefix) {
            let error = Error::msg(format!(
                "Expected sqlite connection url to start with `{}`",
                &prefix
            ));
            log::error!("{:#}", error);
            return Err(error);
        }
        let path = url.trim_start_matches(&prefix);
        let location = if path.starts_with("file:") {
            path.to_string()
        } else {
            format!("file:{}", path)
        };
        let context = || format!("While opening the database `{}`", url);
        let location = CString::new(location).with_context(context)?;
        let connection = spawn_blocking(move || -> Result<CBox<*mut sqlite3>> {
            let mut connection = CBox::new(ptr::null_mut(), |p| unsafe {
                sqlite3_close(p);
            });
            unsafe {
                let rc = sqlite3_open_v2(
                    location.as_ptr(),
                    &mut *connection,
                    SQLITE_OPEN_READWRITE
                        | SQLITE_OPEN_CREATE
                        | SQLITE_OPEN_URI
                        | SQLITE_OPEN_FULLMUTEX,
                    ptr::null(),
                );
                if rc != SQLITE_OK {
                    let message = if connection.is_null() {
                        "Out of memory".to_string()
                    } else {
                        error_message_from_ptr(&sqlite3_errmsg(*connection)).to_string()
                    };
                    return Err(Error::msg(message));
                }
                sqlite3_busy_timeout(*connection, BUSY_TIMEOUT);
            }
            Ok(connection)
        })
        .await?
        .with_context(context);
        match connection {
            Ok(connection) => Ok(Self {
                connection: Arc::new(connection),
            }),
            Err(error) => {
                log::error!("{:#}", error);
                Err(error)
            }
        }
    }
}
