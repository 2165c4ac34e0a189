//! tickstore-influx
//!
//! `TimeSeriesBackend` implementation for InfluxDB 1.x over its HTTP API.
//! Writes go to `/write` as line protocol; queries go to `/query` with every
//! user-supplied value passed as a bound parameter.
#![warn(missing_docs)]

/// Line-protocol encoding.
pub mod line;
/// Query response decoding.
pub mod response;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tickstore_core::{InfluxConfig, Point, Query, Row, TickstoreError, TimeSeriesBackend};
use url::Url;

const NAME: &str = "tickstore-influx";

/// InfluxDB 1.x backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct InfluxBackend {
    client: Client,
    write_url: Url,
    query_url: Url,
}

impl InfluxBackend {
    /// Start building a backend.
    #[must_use]
    pub fn builder() -> InfluxBackendBuilder {
        InfluxBackendBuilder::default()
    }

    /// Backend for the host and port in `cfg`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the host is empty or the port is zero.
    pub fn from_config(cfg: &InfluxConfig) -> Result<Self, TickstoreError> {
        Self::builder().host(&cfg.host).port(cfg.port).build()
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> Url {
        let mut base = self.write_url.clone();
        base.set_path("/");
        base
    }

    async fn fail(resp: Response) -> TickstoreError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        TickstoreError::backend(
            NAME,
            format!("HTTP {status}: {}", response::error_message(&body)),
        )
    }
}

fn transport(e: &reqwest::Error) -> TickstoreError {
    TickstoreError::backend(NAME, e.to_string())
}

#[async_trait]
impl TimeSeriesBackend for InfluxBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "tickstore::influx",
            skip(self, point),
            fields(measurement = %point.measurement),
            err
        )
    )]
    async fn write(&self, point: &Point, database: &str) -> Result<(), TickstoreError> {
        let body = line::encode(point)?;
        let resp = self
            .client
            .post(self.write_url.clone())
            .query(&[("db", database)])
            .body(body)
            .send()
            .await
            .map_err(|e| transport(&e))?;
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        Ok(())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "tickstore::influx",
            skip(self, query),
            fields(market = %query.market()),
            err
        )
    )]
    async fn query(&self, query: &Query, database: &str) -> Result<Vec<Row>, TickstoreError> {
        let params: BTreeMap<&str, String> = query.params();
        let params = serde_json::to_string(&params)
            .map_err(|e| TickstoreError::InvalidArg(format!("cannot encode parameters: {e}")))?;
        let command = query.command();
        let resp = self
            .client
            .get(self.query_url.clone())
            .query(&[
                ("db", database),
                ("q", command.as_str()),
                ("params", params.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport(&e))?;
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        let body = resp.text().await.map_err(|e| transport(&e))?;
        response::rows_from_body(&body).map_err(|e| TickstoreError::backend(NAME, e.to_string()))
    }

    async fn close(&self) -> Result<(), TickstoreError> {
        // The HTTP client holds no session; pooled connections drop with the last clone.
        Ok(())
    }
}

/// Builder for [`InfluxBackend`].
#[derive(Debug, Default)]
pub struct InfluxBackendBuilder {
    host: Option<String>,
    port: Option<u16>,
    timeout: Option<Duration>,
    client: Option<Client>,
}

impl InfluxBackendBuilder {
    /// Host name or address. A leading `http://` or `https://` is kept as given.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// HTTP API port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Per-request timeout. Ignored when a custom client is supplied.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a preconfigured HTTP client.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the backend.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the host is missing or empty, the port is
    /// missing or zero, the resulting URL is invalid, or the client cannot be built.
    pub fn build(self) -> Result<InfluxBackend, TickstoreError> {
        let host = self
            .host
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| TickstoreError::InvalidArg("influx host is required".into()))?;
        let port = self
            .port
            .filter(|p| *p != 0)
            .ok_or_else(|| TickstoreError::InvalidArg("influx port is required".into()))?;

        let base = if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}:{port}/", host.trim_end_matches('/'))
        } else {
            format!("http://{host}:{port}/")
        };
        let base = Url::parse(&base)
            .map_err(|e| TickstoreError::InvalidArg(format!("invalid influx address {base:?}: {e}")))?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| TickstoreError::InvalidArg(format!("invalid influx address: {e}")))
        };

        let client = match self.client {
            Some(c) => c,
            None => {
                let mut b = Client::builder();
                if let Some(t) = self.timeout {
                    b = b.timeout(t);
                }
                b.build().map_err(|e| {
                    TickstoreError::InvalidArg(format!("cannot build HTTP client: {e}"))
                })?
            }
        };

        Ok(InfluxBackend {
            client,
            write_url: join("write")?,
            query_url: join("query")?,
        })
    }
}
