use crate::{Cursor, Error, JSON_CONTENT_TYPE, Result, RowLabeled, Sink, Value};
use futures::TryStreamExt;
use std::fmt::{self, Debug, Display};
use tokio::io::AsyncWriteExt;

/// Failure of a streaming JSON invocation.
///
/// Carries how far the output went: when [`StreamError::is_clean`] is true
/// nothing reached the sink (no header, no byte) and the caller is still free to
/// answer with a different response. Otherwise a truncated but closed array was
/// already written and the error can only be reported out of band.
pub struct StreamError {
    rows: usize,
    started: bool,
    error: Error,
}

impl StreamError {
    /// Failure before any output.
    pub fn clean(error: Error) -> Self {
        Self {
            rows: 0,
            started: false,
            error,
        }
    }
    /// Number of rows completely written before the failure.
    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn is_clean(&self) -> bool {
        !self.started
    }
    pub fn error(&self) -> &Error {
        &self.error
    }
    pub fn into_inner(self) -> Error {
        self.error
    }
}

impl Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.error, f)
    }
}

impl Debug for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamError")
            .field("rows", &self.rows)
            .field("started", &self.started)
            .field("error", &self.error)
            .finish()
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error.as_ref())
    }
}

/// Output framing of one invocation.
#[derive(Default)]
struct Emission {
    rows: usize,
    started: bool,
}

/// Writes the rows of `cursor` into `sink` as a JSON array, one object per line.
///
/// The opening bracket (and the content type header, when the sink has headers)
/// is deferred until the first row is ready. Once it is written, the closing
/// bracket follows on every exit path, failures included.
pub async fn write_json<S: Sink + ?Sized>(
    mut cursor: Cursor<'_>,
    sink: &mut S,
) -> Result<usize, StreamError> {
    let mut emission = Emission::default();
    let mut result = write_rows(&mut cursor, sink, &mut emission).await;
    drop(cursor);
    if emission.started {
        let closed = async {
            sink.write_all(b"\n]").await?;
            sink.flush().await
        }
        .await;
        if let Err(e) = closed
            && result.is_ok()
        {
            result = Err(e.into());
        }
    }
    match result {
        Ok(()) => Ok(emission.rows),
        Err(error) => Err(StreamError {
            rows: emission.rows,
            started: emission.started,
            error,
        }),
    }
}

async fn write_rows<S: Sink + ?Sized>(
    cursor: &mut Cursor<'_>,
    sink: &mut S,
    emission: &mut Emission,
) -> Result<()> {
    let labels = cursor.labels().clone();
    while let Some(values) = cursor.try_next().await? {
        let row = RowLabeled::new(
            labels.clone(),
            values.into_iter().map(Value::normalized).collect(),
        );
        let object = serde_json::to_vec(&row.to_json()?)?;
        if !emission.started {
            if let Some(headers) = sink.headers() {
                headers.set("Content-Type", JSON_CONTENT_TYPE);
            }
            emission.started = true;
            sink.write_all(b"[\n").await?;
        } else {
            sink.write_all(b",\n").await?;
        }
        sink.write_all(&object).await?;
        emission.rows += 1;
    }
    Ok(())
}
