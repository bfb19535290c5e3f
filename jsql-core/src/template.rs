use crate::{Args, Context, Cursor, Error, Result, Row, RowNames, Value};
use futures::{Stream, TryStreamExt, future};
use std::{
    future::Future,
    pin::Pin,
    task::{self, Poll},
};
use tokio::{
    io::AsyncWrite,
    sync::{mpsc, oneshot},
};

/// Rows handed to a template, in cursor order.
///
/// The sequence ends when the query has no more rows (or failed, the failure is
/// reported by the invocation, not here). A template may stop reading at any
/// time: returning from [`Template::render`] ends the query early.
#[derive(Debug)]
pub struct Results {
    receiver: mpsc::Receiver<Row>,
}

impl Results {
    /// Next row, `None` once the rows are exhausted.
    pub async fn next(&mut self) -> Option<Row> {
        self.receiver.recv().await
    }
}

impl Stream for Results {
    type Item = Row;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> Poll<Option<Row>> {
        self.receiver.poll_recv(cx)
    }
}

/// Everything a template can refer to while rendering.
#[derive(Debug)]
pub struct TemplateContext<'a> {
    /// Arguments of the invocation.
    pub args: &'a Args,
    /// Labels of the values in each row.
    pub columns: RowNames,
    /// The rows, produced while the template renders.
    pub results: Results,
}

/// A text renderer fed with the rows of a query.
///
/// Rows are plain value lists (normalized like the JSON output), the labels are
/// in [`TemplateContext::columns`].
pub trait Template: Sync {
    fn render<W>(
        &self,
        context: TemplateContext<'_>,
        out: &mut W,
    ) -> impl Future<Output = Result<()>> + Send
    where
        W: AsyncWrite + Unpin + Send + ?Sized;
}

/// Renders `template` with the rows of `cursor` while they are fetched.
///
/// Fetching and rendering run concurrently inside the current task. Rows are
/// handed over through a single slot channel, the outcome of the rendering
/// comes back through a oneshot channel. The rendering always completes before
/// this returns. An error of the cursor wins over the error of the template.
pub async fn render_template<T, W>(
    cursor: Cursor<'_>,
    args: &Args,
    template: &T,
    out: &mut W,
) -> Result<()>
where
    T: Template + ?Sized,
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    let (rows, receiver) = mpsc::channel(1);
    let (done, rendered) = oneshot::channel();
    let context = TemplateContext {
        args,
        columns: cursor.labels().clone(),
        results: Results { receiver },
    };
    let render = async move {
        let result = template
            .render(context, out)
            .await
            .context("While rendering the template");
        let _ = done.send(result);
    };
    let ((), result) = future::join(render, fetch_rows(cursor, rows, rendered)).await;
    result
}

async fn fetch_rows(
    mut cursor: Cursor<'_>,
    rows: mpsc::Sender<Row>,
    mut rendered: oneshot::Receiver<Result<()>>,
) -> Result<()> {
    let mut failure = None;
    loop {
        let values = match cursor.try_next().await {
            Ok(Some(values)) => values,
            Ok(None) => break,
            Err(e) => {
                failure = Some(e);
                break;
            }
        };
        let row: Row = values.into_iter().map(Value::normalized).collect();
        tokio::select! {
            biased;
            result = &mut rendered => {
                // The template returned before consuming every row
                return result.unwrap_or_else(|_| Err(renderer_gone()));
            }
            sent = rows.send(row) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
    drop(rows);
    drop(cursor);
    let result = rendered.await.unwrap_or_else(|_| Err(renderer_gone()));
    match failure {
        Some(e) => Err(e),
        None => result,
    }
}

fn renderer_gone() -> Error {
    Error::msg("The template renderer stopped without reporting its result")
}
