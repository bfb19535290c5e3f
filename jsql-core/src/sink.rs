use std::io::Cursor;
use tokio::{
    fs::File,
    io::{AsyncWrite, BufWriter, DuplexStream, Stdout},
};

/// Content type announced by the JSON executor on sinks with headers.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Response metadata written ahead of the body.
pub trait Headers: Send {
    fn set(&mut self, name: &str, value: &str);
}

/// Destination of the JSON output.
///
/// A sink that is the body of a response exposes its headers, the executor sets
/// the content type right before the first byte and never afterwards. Plain
/// writers have no headers.
pub trait Sink: AsyncWrite + Unpin + Send {
    fn headers(&mut self) -> Option<&mut dyn Headers> {
        None
    }
}

impl Sink for Vec<u8> {}
impl Sink for Cursor<Vec<u8>> {}
impl Sink for Cursor<&mut Vec<u8>> {}
impl Sink for DuplexStream {}
impl Sink for File {}
impl Sink for Stdout {}
impl Sink for tokio::io::Sink {}

impl<S: Sink> Sink for BufWriter<S> {
    fn headers(&mut self) -> Option<&mut dyn Headers> {
        self.get_mut().headers()
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn headers(&mut self) -> Option<&mut dyn Headers> {
        (**self).headers()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn headers(&mut self) -> Option<&mut dyn Headers> {
        (**self).headers()
    }
}
