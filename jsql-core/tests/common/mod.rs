#![allow(dead_code)]
use jsql_core::{
    Connection, Cursor, Driver, Error, Executor, Headers, Placeholders, Prepared, Result, Row,
    RowNames, Sink, Value, stream,
};
use std::{
    borrow::Cow,
    fmt::{self, Display},
    io,
    pin::Pin,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    task::{Context, Poll},
};
use jsql_core::stream::StreamExt;
use tokio::io::AsyncWrite;

/// Outcome of each cursor step of the mock backend.
#[derive(Clone)]
pub enum Step {
    Row(Vec<Value>),
    Fail(&'static str),
}

#[derive(Default)]
pub struct MockDriver {}

impl Driver for MockDriver {
    type Connection = MockConnection;
    type Prepared = MockPrepared;

    const NAME: &'static str = "mock";
    const PLACEHOLDERS: Placeholders = Placeholders::Numbered;

    fn get_instance() -> Self {
        MockDriver {}
    }
}

/// Backend that answers every statement with the same canned rows.
#[derive(Default)]
pub struct MockConnection {
    pub labels: Vec<&'static str>,
    pub steps: Vec<Step>,
    pub reject_prepare: bool,
    pub reject_query: bool,
    pub fetched: Arc<AtomicUsize>,
    pub executions: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl MockConnection {
    pub fn new(labels: &[&'static str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            labels: labels.to_vec(),
            steps: rows.into_iter().map(Step::Row).collect(),
            ..Default::default()
        }
    }
}

impl Executor for MockConnection {
    type Driver = MockDriver;

    fn driver(&self) -> &Self::Driver {
        &MockDriver {}
    }

    async fn prepare(&self, sql: String) -> Result<MockPrepared> {
        if self.reject_prepare {
            return Err(Error::msg(format!("syntax error in `{sql}`")));
        }
        Ok(MockPrepared {
            sql,
            labels: self.labels.iter().map(|v| v.to_string()).collect(),
            steps: self.steps.clone(),
            reject_query: self.reject_query,
            fetched: self.fetched.clone(),
            executions: self.executions.clone(),
        })
    }

    async fn execute(&self, _sql: String) -> Result<()> {
        Ok(())
    }
}

impl Connection for MockConnection {
    async fn connect(url: Cow<'static, str>) -> Result<Self> {
        if !url.starts_with("mock://") {
            return Err(Error::msg("Expected a mock:// url"));
        }
        Ok(Default::default())
    }
}

pub struct MockPrepared {
    pub sql: String,
    labels: RowNames,
    steps: Vec<Step>,
    reject_query: bool,
    fetched: Arc<AtomicUsize>,
    executions: Arc<Mutex<Vec<Vec<Value>>>>,
}

impl Prepared for MockPrepared {
    async fn query(&self, params: Vec<Value>) -> Result<Cursor<'_>> {
        self.executions.lock().unwrap().push(params);
        if self.reject_query {
            return Err(Error::msg("could not bind the parameters"));
        }
        let fetched = self.fetched.clone();
        Ok(Cursor::new(
            self.labels.clone(),
            stream::iter(self.steps.clone()).map(move |step| {
                fetched.fetch_add(1, Ordering::SeqCst);
                match step {
                    Step::Row(values) => Ok(Row::from(values)),
                    Step::Fail(message) => Err(Error::msg(message)),
                }
            }),
        ))
    }
}

impl Display for MockPrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Sink with headers, like the body of a response.
#[derive(Default)]
pub struct Recorder {
    pub body: Vec<u8>,
    pub headers: RecordedHeaders,
}

#[derive(Default)]
pub struct RecordedHeaders(pub Vec<(String, String)>);

impl Headers for RecordedHeaders {
    fn set(&mut self, name: &str, value: &str) {
        self.0.push((name.into(), value.into()));
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

impl Recorder {
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).expect("The body is not valid UTF-8")
    }
}

/// The rows of the original end to end example: `(1,one) (5,five) (7,seven) (9,nine)`.
pub fn foo_rows() -> Vec<Vec<Value>> {
    [(1, "one"), (5, "five"), (7, "seven"), (9, "nine")]
        .into_iter()
        .map(|(i, s)| vec![Value::Int64(Some(i)), Value::Varchar(Some(s.into()))])
        .collect()
}
