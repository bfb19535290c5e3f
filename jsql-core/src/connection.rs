use crate::{Executor, Result};
use std::{borrow::Cow, future::Future};

pub trait Connection: Executor + Sized {
    /// Open a connection to the given URL
    fn connect(url: Cow<'static, str>) -> impl Future<Output = Result<Self>> + Send;
}
