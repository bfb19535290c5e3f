use crate::{PostgresDriver, PostgresPrepared};
use jsql_core::{Connection, Context, Driver, Error, Executor, Result, truncate_long};
use openssl::ssl::{SslConnector, SslFiletype, SslMethod, SslVerifyMode};
use postgres_openssl::MakeTlsConnector;
use std::{borrow::Cow, env, path::Path, sync::Arc};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    spawn,
};
use tokio_postgres::{Client, NoTls, tls::TlsStream};
use url::Url;
use urlencoding::decode;

/// Connection to a postgres server.
///
/// The client is shared with every statement prepared on it, so statements
/// stay valid while the connection value is moved around.
pub struct PostgresConnection {
    pub(crate) client: Arc<Client>,
}

/// Drives the socket in the background until the client goes away.
fn spawn_connection<S, T>(connection: tokio_postgres::Connection<S, T>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    T: TlsStream + Unpin + Send + 'static,
{
    spawn(async move {
        if let Err(e) = connection.await
            && !e.is_closed()
        {
            log::error!("Postgres connection error: {:#}", e);
        }
    });
}

impl Executor for PostgresConnection {
    type Driver = PostgresDriver;

    fn driver(&self) -> &Self::Driver {
        &PostgresDriver {}
    }

    async fn prepare(&self, sql: String) -> Result<PostgresPrepared> {
        let trimmed = sql.trim_end().trim_end_matches(';');
        let statement = self.client.prepare(trimmed).await.map_err(|e| {
            let e = Error::new(e);
            log::error!("{:#}", e);
            e
        })?;
        Ok(PostgresPrepared::new(self.client.clone(), statement, sql))
    }

    async fn execute(&self, sql: String) -> Result<()> {
        self.client.batch_execute(&sql).await.map_err(|e| {
            let e = Error::new(e).context(format!(
                "While executing the query:\n{}",
                truncate_long!(sql)
            ));
            log::error!("{:#}", e);
            e
        })
    }
}

impl Connection for PostgresConnection {
    async fn connect(url: Cow<'static, str>) -> Result<PostgresConnection> {
        let context = || format!("While trying to connect to `{}`", url);
        let decoded = decode(&url).with_context(context)?;
        let prefix = format!("{}://", <Self::Driver as Driver>::NAME);
        if !decoded.starts_with(&prefix) {
            let error = Error::msg(format!(
                "Postgres connection url must start with `{}`",
                &prefix
            ))
            .context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        let mut parsed = Url::parse(&decoded).with_context(context)?;
        let mut take_url_param = |key: &str, env_var: &str| {
            let mut pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| (k.into(), v.into()))
                .collect();
            let value = pairs
                .iter()
                .position(|(k, _)| k == key)
                .map(|pos| pairs.remove(pos).1);
            if pairs.is_empty() {
                parsed.set_query(None);
            } else {
                parsed
                    .query_pairs_mut()
                    .clear()
                    .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            }
            value.or_else(|| env::var(env_var).ok())
        };
        let sslmode = take_url_param("sslmode", "PGSSLMODE").unwrap_or("disable".into());
        let client = if sslmode == "disable" {
            let (client, connection) = tokio_postgres::connect(parsed.as_str(), NoTls)
                .await
                .with_context(context)?;
            spawn_connection(connection);
            client
        } else {
            let mut builder = SslConnector::builder(SslMethod::tls())?;
            if let Some(path) = take_url_param("sslrootcert", "PGSSLROOTCERT")
                .as_deref()
                .map(Path::new)
                && path.exists()
            {
                builder.set_ca_file(path)?;
            }
            if let Some(path) = take_url_param("sslcert", "PGSSLCERT")
                .as_deref()
                .map(Path::new)
                && path.exists()
            {
                builder.set_certificate_chain_file(path)?;
            }
            if let Some(path) = take_url_param("sslkey", "PGSSLKEY")
                .as_deref()
                .map(Path::new)
                && path.exists()
            {
                builder.set_private_key_file(path, SslFiletype::PEM)?;
            }
            // `require` encrypts without checking who is on the other side
            builder.set_verify(if sslmode == "require" {
                SslVerifyMode::NONE
            } else {
                SslVerifyMode::PEER
            });
            let connector = MakeTlsConnector::new(builder.build());
            let (client, connection) = tokio_postgres::connect(parsed.as_str(), connector)
                .await
                .with_context(context)?;
            spawn_connection(connection);
            client
        };
        Ok(Self {
            client: Arc::new(client),
        })
    }
}
