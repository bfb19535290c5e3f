use crate::{Connection, Placeholders, Prepared, Result};
use std::{borrow::Cow, future::Future};

pub trait Driver: Send + Sync {
    type Connection: Connection;
    type Prepared: Prepared;

    /// Scheme of the connection URLs, `sqlite` for `sqlite://...`.
    const NAME: &'static str;
    /// Positional parameter syntax the backend accepts, used unless a query asks otherwise.
    const PLACEHOLDERS: Placeholders;

    fn get_instance() -> Self;

    fn connect(
        &self,
        url: Cow<'static, str>,
    ) -> impl Future<Output = Result<Self::Connection>> + Send {
        Self::Connection::connect(url)
    }
}
