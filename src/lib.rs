//! Prepare SQL queries written with named `${placeholders}` and stream their
//! rows as JSON arrays or into text templates.
//!
//! ```rust,ignore
//! use jsql::{Connection, Executor, args};
//! use jsql_sqlite::SqliteConnection;
//!
//! let connection = SqliteConnection::connect("sqlite://:memory:".into()).await?;
//! let query = connection
//!     .prepare_query("SELECT i AS int, s AS string FROM foo WHERE i > ${first}")
//!     .await?;
//! let mut out = Vec::new();
//! query.write_json(&args! { "first" => 3 }, &mut out).await?;
//! ```
pub use jsql_core::*;
