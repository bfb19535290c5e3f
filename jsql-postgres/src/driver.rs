use crate::{PostgresConnection, PostgresPrepared};
use jsql_core::{Driver, Placeholders};

#[derive(Default, Debug)]
pub struct PostgresDriver {}

impl PostgresDriver {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Driver for PostgresDriver {
    type Connection = PostgresConnection;
    type Prepared = PostgresPrepared;

    const NAME: &'static str = "postgres";
    const PLACEHOLDERS: Placeholders = Placeholders::Numbered;

    fn get_instance() -> Self {
        Self::new()
    }
}
