mod concurrent;
mod foo;
mod recorder;
mod template;

use crate::{
    concurrent::concurrent,
    foo::{foo, foo_numbered, preparation_failure},
    template::{template, template_failure},
};
use jsql::Connection;
use log::LevelFilter;
use std::env;

pub use recorder::*;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

pub async fn execute_tests<C: Connection>(connection: C) {
    foo(&connection).await;
    foo_numbered(&connection).await;
    preparation_failure(&connection).await;
    concurrent(&connection).await;
    template(&connection).await;
    template_failure(&connection).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
