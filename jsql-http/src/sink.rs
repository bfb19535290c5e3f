use axum::http::{HeaderMap, HeaderName, HeaderValue};
use jsql_core::{Headers, Sink};
use std::{
    io, mem,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::{
    io::{AsyncWrite, DuplexStream},
    sync::oneshot,
};

/// Writing end of a streamed response body.
///
/// Headers set on the sink are kept until the first byte is written, at that
/// point they are handed to whoever builds the response and the bytes flow into
/// the body pipe. A sink dropped without writing never starts a response.
pub struct ResponseSink {
    body: DuplexStream,
    headers: HeaderMap,
    started: Option<oneshot::Sender<HeaderMap>>,
}

impl ResponseSink {
    /// The receiver resolves with the headers on the first write, or fails if nothing was written.
    pub fn new(body: DuplexStream) -> (Self, oneshot::Receiver<HeaderMap>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                body,
                headers: HeaderMap::new(),
                started: Some(sender),
            },
            receiver,
        )
    }

    pub fn is_started(&self) -> bool {
        self.started.is_none()
    }
}

impl Headers for ResponseSink {
    fn set(&mut self, name: &str, value: &str) {
        if self.is_started() {
            log::warn!("Header `{}` set after the response started, ignoring it", name);
            return;
        }
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => log::warn!("Ignoring the invalid header `{}: {}`", name, value),
        }
    }
}

impl AsyncWrite for ResponseSink {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if let Some(started) = this.started.take() {
            // The receiver is gone when the request was abandoned, the next write fails
            let _ = started.send(mem::take(&mut this.headers));
        }
        Pin::new(&mut this.body).poll_write(cx, buf)
    }
    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().body).poll_flush(cx)
    }
    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().body).poll_shutdown(cx)
    }
}

impl Sink for ResponseSink {
    fn headers(&mut self) -> Option<&mut dyn Headers> {
        Some(self)
    }
}

