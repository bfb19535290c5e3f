//! Serve prepared queries over HTTP.
//!
//! A [`QueryHandler`] is an axum handler: it binds the placeholders of its
//! query from the request and streams the rows back as a JSON array.
//!
//! ```rust,ignore
//! let handler = QueryHandler::prepare(
//!     &connection,
//!     "SELECT i AS int, s AS string FROM foo WHERE i > ${first} AND NOT s LIKE ${pat}",
//! )
//! .await?;
//! let app = Router::new().route("/foo/:first", get(handler.clone()).post(handler));
//! ```
mod config;
mod extract;
mod handler;
mod sink;

pub use config::*;
pub use extract::*;
pub use handler::*;
pub use sink::*;
