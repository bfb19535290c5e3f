use jsql::{Headers, Sink};
use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::io::AsyncWrite;

/// In memory response: body bytes plus the headers set on it.
#[derive(Default, Debug)]
pub struct Recorder {
    pub body: Vec<u8>,
    pub headers: RecordedHeaders,
}

#[derive(Default, Debug)]
pub struct RecordedHeaders(pub Vec<(String, String)>);

impl RecordedHeaders {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl Headers for RecordedHeaders {
    fn set(&mut self, name: &str, value: &str) {
        self.0.push((name.into(), value.into()));
    }
}

impl Recorder {
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).expect("The body is not valid UTF-8")
    }
}

impl AsyncWrite for Recorder {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().body).poll_write(cx, buf)
    }
    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().body).poll_flush(cx)
    }
    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().body).poll_shutdown(cx)
    }
}

impl Sink for Recorder {
    fn headers(&mut self) -> Option<&mut dyn Headers> {
        Some(&mut self.headers)
    }
}
