mod args;
mod as_value;
mod connection;
mod cursor;
mod driver;
mod executor;
mod json;
mod prepared;
mod prepared_query;
mod query;
mod rewrite;
mod sink;
mod template;
mod util;
mod value;

pub use ::anyhow::Context;
pub use args::*;
pub use as_value::*;
pub use connection::*;
pub use cursor::*;
pub use driver::*;
pub use executor::*;
pub use json::*;
pub use prepared::*;
pub use prepared_query::*;
pub use query::*;
pub use rewrite::*;
pub use sink::*;
pub use template::*;
#[doc(hidden)]
pub use util::floor_char_boundary;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T, E = Error> = std::result::Result<T, E>;
pub type Error = anyhow::Error;
