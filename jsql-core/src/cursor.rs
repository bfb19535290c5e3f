use crate::{Result, Row, RowNames};
use futures::{Stream, StreamExt, stream::BoxStream};
use std::{
    fmt::{self, Debug},
    pin::Pin,
    task::{Context, Poll},
};

/// Rows produced by one execution of a prepared statement.
///
/// The column labels are known as soon as the statement runs, the rows are
/// fetched lazily while the cursor is polled. Dropping the cursor releases the
/// driver resources held by the execution.
pub struct Cursor<'s> {
    labels: RowNames,
    rows: BoxStream<'s, Result<Row>>,
}

impl<'s> Cursor<'s> {
    pub fn new(labels: RowNames, rows: impl Stream<Item = Result<Row>> + Send + 's) -> Self {
        Self {
            labels,
            rows: rows.boxed(),
        }
    }
    pub fn labels(&self) -> &RowNames {
        &self.labels
    }
}

impl Stream for Cursor<'_> {
    type Item = Result<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rows.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}
