#[cfg(test)]
mod tests {
    use axum::http::header::CONTENT_TYPE;
    use jsql_core::{Headers, JSON_CONTENT_TYPE, Sink};
    use jsql_http::ResponseSink;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

    #[tokio::test]
    async fn headers_sent_on_first_write() {
        let (writer, mut reader) = duplex(64);
        let (mut sink, mut started) = ResponseSink::new(writer);
        sink.headers()
            .unwrap()
            .set("Content-Type", JSON_CONTENT_TYPE);
        assert!(started.try_recv().is_err());
        sink.write_all(b"[\n").await.unwrap();
        let headers = started.await.unwrap();
        assert_eq!(headers[CONTENT_TYPE], JSON_CONTENT_TYPE);
        sink.set("X-Late", "ignored");
        sink.write_all(b"\n]").await.unwrap();
        drop(sink);
        let mut body = String::new();
        reader.read_to_string(&mut body).await.unwrap();
        assert_eq!(body, "[\n\n]");
    }

    #[tokio::test]
    async fn never_started() {
        let (writer, _reader) = duplex(64);
        let (mut sink, started) = ResponseSink::new(writer);
        sink.set("Content-Type", JSON_CONTENT_TYPE);
        sink.set("Bad Name", "value");
        drop(sink);
        assert!(started.await.is_err());
    }
}
