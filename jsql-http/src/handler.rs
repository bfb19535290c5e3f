use crate::{BodyKind, HandlerConfig, RequestArgs, ResponseSink};
use axum::{
    body::{Body, to_bytes},
    extract::{FromRequestParts, Path, Request},
    handler::Handler,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream};
use jsql_core::{Args, Driver, Executor, Prepared, PreparedQuery, Result};
use std::{collections::HashMap, future::Future, io, pin::Pin, sync::Arc};
use tokio::{
    io::{AsyncReadExt, DuplexStream, duplex},
    spawn,
};

/// Bytes buffered between the query and the connection before the query waits.
const PIPE_CAPACITY: usize = 16 << 10;

/// An axum handler running one prepared query per request.
///
/// The placeholders are bound from the request (see [`RequestArgs`]) and the
/// rows are streamed back as JSON while they are fetched. A failure before the
/// first row becomes a `500` with the error text, a failure after it can only
/// end the array early and is logged.
pub struct QueryHandler<P: Prepared> {
    query: Arc<PreparedQuery<P>>,
    config: HandlerConfig,
}

impl<P: Prepared> Clone for QueryHandler<P> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            config: self.config,
        }
    }
}

/// Handler serving `query`.
pub fn query_handler<P: Prepared>(query: Arc<PreparedQuery<P>>) -> QueryHandler<P> {
    QueryHandler::new(query)
}

/// Prepares `query` and wraps it in a handler, panicking when the query is
/// rejected. Meant for route tables built once at startup.
pub async fn handler_or_panic<E: Executor>(
    executor: &E,
    query: &str,
) -> QueryHandler<<E::Driver as Driver>::Prepared> {
    match QueryHandler::prepare(executor, query).await {
        Ok(handler) => handler,
        Err(e) => panic!("handler_or_panic({:?}): {:#}", query, e),
    }
}

impl<P: Prepared> QueryHandler<P> {
    pub fn new(query: Arc<PreparedQuery<P>>) -> Self {
        Self {
            query,
            config: Default::default(),
        }
    }

    pub async fn prepare<E>(executor: &E, query: &str) -> Result<Self>
    where
        E: Executor,
        E::Driver: Driver<Prepared = P>,
    {
        Ok(Self::new(Arc::new(PreparedQuery::new(executor, query).await?)))
    }

    pub fn with_config(mut self, config: HandlerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn query(&self) -> &Arc<PreparedQuery<P>> {
        &self.query
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }
}

impl<P: Prepared + 'static> QueryHandler<P> {
    /// Answers `request`.
    pub async fn handle(&self, request: Request) -> Response {
        let (mut parts, body) = request.into_parts();
        let mut args = RequestArgs {
            path: Path::<HashMap<String, String>>::from_request_parts(&mut parts, &())
                .await
                .map(|Path(path)| path)
                .unwrap_or_default(),
            ..Default::default()
        };
        let kind = BodyKind::of(&parts.method, &parts.headers);
        if kind != BodyKind::Ignored {
            let decoded = match to_bytes(body, self.config.max_body_size).await {
                Ok(body) if kind == BodyKind::Json => args.set_json(&body),
                Ok(body) => {
                    args.extend_form(&body);
                    Ok(())
                }
                Err(e) => Err(e.into()),
            };
            if let Err(e) = decoded {
                let kind = if kind == BodyKind::Json { "json" } else { "form" };
                return (
                    StatusCode::BAD_REQUEST,
                    format!("Can't decode {} request: {:#}", kind, e),
                )
                    .into_response();
            }
        }
        if let Some(query) = parts.uri.query() {
            args.extend_form(query.as_bytes());
        }
        let args = args.resolve(self.query.names());
        self.respond(parts.method, parts.uri, args).await
    }

    /// Runs the query in its own task, the response starts with its first byte.
    async fn respond(&self, method: Method, uri: Uri, args: Args) -> Response {
        let (writer, reader) = duplex(PIPE_CAPACITY);
        let (mut sink, started) = ResponseSink::new(writer);
        let query = self.query.clone();
        let execution = spawn(async move {
            let result = query.write_json(&args, &mut sink).await;
            drop(sink);
            if let Err(e) = &result
                && !e.is_clean()
            {
                log::warn!("{} {}: {:#}", method, uri, e.error());
            }
            result
        });
        if let Ok(headers) = started.await {
            let mut response = Response::new(Body::from_stream(body_stream(reader)));
            *response.headers_mut() = headers;
            return response;
        }
        match execution.await {
            Ok(Ok(..)) => StatusCode::OK.into_response(),
            Ok(Err(e)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e.error())).into_response()
            }
            Err(e) => {
                log::error!("The query task failed: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Reads the pipe until the writing side is dropped.
fn body_stream(reader: DuplexStream) -> impl Stream<Item = io::Result<Bytes>> + Send {
    stream::unfold(Some(reader), |reader| async move {
        let mut reader = reader?;
        let mut buffer = BytesMut::with_capacity(PIPE_CAPACITY);
        match reader.read_buf(&mut buffer).await {
            Ok(0) => None,
            Ok(..) => Some((Ok(buffer.freeze()), Some(reader))),
            Err(e) => Some((Err(e), None)),
        }
    })
}

impl<P, S> Handler<(), S> for QueryHandler<P>
where
    P: Prepared + 'static,
    S: Send + Sync + 'static,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, request: Request, _state: S) -> Self::Future {
        Box::pin(async move { self.handle(request).await })
    }
}
