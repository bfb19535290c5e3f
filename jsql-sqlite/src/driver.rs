use crate::{SqliteConnection, SqlitePrepared};
use jsql_core::{Driver, Placeholders};

#[derive(Default, Debug)]
pub struct SqliteDriver {}

impl SqliteDriver {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Driver for SqliteDriver {
    type Connection = SqliteConnection;
    type Prepared = SqlitePrepared;

    const NAME: &'static str = "sqlite";
    const PLACEHOLDERS: Placeholders = Placeholders::Unnumbered;

    fn get_instance() -> Self {
        Self::new()
    }
}
