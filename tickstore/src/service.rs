use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;
use chrono_tz::Tz;
use tracing::Dispatch;
use tracing::instrument::{Instrument, WithSubscriber};

use tickstore_core::query::{MARKET_TAG, PRICE_FIELD};
use tickstore_core::{
    AppConfig, Candle, DEFAULT_DISPLAY_TZ, DEFAULT_MEASUREMENT, FieldValue, Point, QueryBuilder,
    Ticker, TickstoreError, TimeRange, TimeSeriesBackend, TimeSeriesConfig, decode_candle_row,
    decode_ticker_row, span_for,
};

use crate::guard::{QueryGuard, tag_err};

/// Caller-facing price store contract.
///
/// Handler layers depend on this trait so they can run against a test double.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Record one price observation for `market`.
    async fn push_ticker(&self, market: &str, ticker: &Ticker) -> Result<(), TickstoreError>;

    /// Most recent price of `market`.
    async fn get_ticker(&self, market: &str) -> Result<Ticker, TickstoreError>;

    /// OHLC candles of `market` over `range`, newest first.
    async fn get_price_charts(
        &self,
        market: &str,
        range: &TimeRange,
    ) -> Result<Vec<Candle>, TickstoreError>;

    /// Release the backend connection.
    async fn close(&self);
}

/// Lifecycle of a [`TimeSeriesService`].
///
/// A service only exists once built, so an instance is never observed as
/// `Disconnected`; the variant names the builder stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceState {
    /// Not yet built.
    Disconnected,
    /// Accepting operations.
    Connected,
    /// Closed; every operation fails with `Closed`.
    Closed,
}

const CONNECTED: u8 = 1;
const CLOSED: u8 = 2;

/// Records tickers and serves latest prices and OHLC charts from a time-series backend.
///
/// The service shares one backend handle across all callers and adds no
/// locking of its own. Every call is one round trip; there is no caching and
/// no timeout, so callers that need a deadline wrap calls themselves.
///
/// `close` must not race with in-flight operations.
pub struct TimeSeriesService {
    backend: Arc<dyn TimeSeriesBackend>,
    database: String,
    queries: QueryBuilder,
    dispatch: Dispatch,
    span: tracing::Span,
    state: AtomicU8,
}

impl TimeSeriesService {
    /// Start building a service.
    #[must_use]
    pub fn builder() -> TimeSeriesServiceBuilder {
        TimeSeriesServiceBuilder::new()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ServiceState {
        match self.state.load(Ordering::Acquire) {
            CLOSED => ServiceState::Closed,
            _ => ServiceState::Connected,
        }
    }

    /// Database every read and write targets.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Name of the backend in use.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn ensure_open(&self) -> Result<(), TickstoreError> {
        if self.state.load(Ordering::Acquire) == CLOSED {
            return Err(TickstoreError::Closed);
        }
        Ok(())
    }

    /// Run `fut` inside the service span, logging to the injected dispatcher.
    async fn scoped<T>(&self, fut: impl Future<Output = T>) -> T {
        fut.instrument(self.span.clone())
            .with_subscriber(self.dispatch.clone())
            .await
    }

    /// Write one observation of `market`.
    ///
    /// The point carries no timestamp: the backend stamps it at write time, so
    /// `ticker.observed_at` is not stored.
    ///
    /// # Errors
    /// `Closed` after [`close`](Self::close), `InvalidArg` if `market` is blank
    /// or the price does not fit the backend's float representation, `Backend`
    /// if the write fails.
    pub async fn push_ticker(&self, market: &str, ticker: &Ticker) -> Result<(), TickstoreError> {
        self.ensure_open()?;
        if market.trim().is_empty() {
            return Err(TickstoreError::InvalidArg("market name is required".to_string()));
        }
        // Parsing the decimal text yields the float nearest to the exact value.
        let price = ticker
            .price
            .to_string()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| {
                TickstoreError::InvalidArg(format!("price {} is not representable", ticker.price))
            })?;
        let point = Point::new(self.queries.measurement())
            .tag(MARKET_TAG, market)
            .field(PRICE_FIELD, FieldValue::Float(price));

        self.scoped(async {
            tracing::debug!(market, "add new {:?} measurement", point.measurement);
            if let Err(e) = self.backend.write(&point, &self.database).await {
                let e = tag_err(self.backend.name(), e);
                tracing::error!(market, error = %e, "cannot add measurement");
                return Err(e);
            }
            tracing::debug!(market, "measurement added");
            Ok(())
        })
        .await
    }

    /// Most recent price of `market`.
    ///
    /// # Errors
    /// `Closed` after [`close`](Self::close), `NotFound` when the market has no
    /// observation, `MalformedRow` when the returned row does not decode,
    /// `Backend` when the query fails.
    pub async fn get_ticker(&self, market: &str) -> Result<Ticker, TickstoreError> {
        self.ensure_open()?;
        let query = self.queries.latest(market);
        self.scoped(async {
            QueryGuard::new(self.backend.as_ref(), &self.database)
                .run(&query, |rows| {
                    let Some(first) = rows.first() else {
                        return Err(TickstoreError::not_found(format!("ticker for {market}")));
                    };
                    decode_ticker_row(first)
                        .map_err(|defects| TickstoreError::MalformedRow { row: 0, defects })
                })
                .await
        })
        .await
    }

    /// OHLC candles of `market` over `range`, in backend order (newest first).
    ///
    /// The bucket width follows from the range duration. A range that matches
    /// no observation yields an empty vector. The call is all-or-nothing: the
    /// first row that fails to decode aborts it.
    ///
    /// # Errors
    /// `Closed` after [`close`](Self::close), `MalformedRow` naming the first
    /// bad row, `Backend` when the query fails.
    pub async fn get_price_charts(
        &self,
        market: &str,
        range: &TimeRange,
    ) -> Result<Vec<Candle>, TickstoreError> {
        self.ensure_open()?;
        let span = span_for(range);
        let query = self.queries.chart(market, range, span);
        self.scoped(async {
            tracing::debug!(market, %span, start = %range.start, end = %range.end, "building chart");
            QueryGuard::new(self.backend.as_ref(), &self.database)
                .run(&query, |rows| {
                    rows.iter()
                        .enumerate()
                        .map(|(row, cells)| {
                            decode_candle_row(cells)
                                .map_err(|defects| TickstoreError::MalformedRow { row, defects })
                        })
                        .collect::<Result<Vec<_>, _>>()
                })
                .await
        })
        .await
    }

    /// Release the backend connection.
    ///
    /// Only the first call reaches the backend; later calls return immediately.
    /// A failure to release is logged, not returned.
    pub async fn close(&self) {
        if self.state.swap(CLOSED, Ordering::AcqRel) == CLOSED {
            return;
        }
        self.scoped(async {
            match self.backend.close().await {
                Ok(()) => tracing::debug!("connection closed"),
                Err(e) => tracing::error!(error = %e, "cannot close connection"),
            }
        })
        .await;
    }
}

#[async_trait]
impl PriceStore for TimeSeriesService {
    async fn push_ticker(&self, market: &str, ticker: &Ticker) -> Result<(), TickstoreError> {
        Self::push_ticker(self, market, ticker).await
    }

    async fn get_ticker(&self, market: &str) -> Result<Ticker, TickstoreError> {
        Self::get_ticker(self, market).await
    }

    async fn get_price_charts(
        &self,
        market: &str,
        range: &TimeRange,
    ) -> Result<Vec<Candle>, TickstoreError> {
        Self::get_price_charts(self, market, range).await
    }

    async fn close(&self) {
        Self::close(self).await;
    }
}

/// Builder for [`TimeSeriesService`].
pub struct TimeSeriesServiceBuilder {
    backend: Option<Arc<dyn TimeSeriesBackend>>,
    database: Option<String>,
    measurement: String,
    display_tz: Tz,
    dispatch: Option<Dispatch>,
}

impl Default for TimeSeriesServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSeriesServiceBuilder {
    /// Builder with the default measurement and display timezone and no backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backend: None,
            database: None,
            measurement: DEFAULT_MEASUREMENT.to_string(),
            display_tz: DEFAULT_DISPLAY_TZ,
            dispatch: None,
        }
    }

    /// Backend to read from and write to. Required.
    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn TimeSeriesBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Database name. Required.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Measurement price points live in.
    #[must_use]
    pub fn measurement(mut self, measurement: impl Into<String>) -> Self {
        self.measurement = measurement.into();
        self
    }

    /// Timezone chart buckets are aligned to.
    #[must_use]
    pub const fn display_tz(mut self, tz: Tz) -> Self {
        self.display_tz = tz;
        self
    }

    /// Apply the measurement and display timezone from `cfg`.
    #[must_use]
    pub fn settings(self, cfg: &TimeSeriesConfig) -> Self {
        self.measurement(cfg.measurement.clone())
            .display_tz(cfg.display_tz)
    }

    /// Apply the database name and service settings from a loaded config.
    #[must_use]
    pub fn config(self, cfg: &AppConfig) -> Self {
        self.database(cfg.influx.db_name.clone())
            .settings(&cfg.timeseries)
    }

    /// Dispatcher every log event of the service goes to.
    ///
    /// Defaults to the dispatcher current when [`build`](Self::build) runs.
    #[must_use]
    pub fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Build the service.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no backend was set, or the database or
    /// measurement name is empty.
    pub fn build(self) -> Result<TimeSeriesService, TickstoreError> {
        let backend = self.backend.ok_or_else(|| {
            TickstoreError::InvalidArg("no backend set; add one via backend(...)".to_string())
        })?;
        let database = self
            .database
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| TickstoreError::InvalidArg("database name is required".to_string()))?;
        if self.measurement.trim().is_empty() {
            return Err(TickstoreError::InvalidArg(
                "measurement name is required".to_string(),
            ));
        }

        let dispatch = self
            .dispatch
            .unwrap_or_else(|| tracing::dispatcher::get_default(Clone::clone));
        let span = tracing::dispatcher::with_default(&dispatch, || {
            tracing::info_span!("timeseries", backend = backend.name(), database = %database)
        });

        Ok(TimeSeriesService {
            backend,
            database,
            queries: QueryBuilder::new(self.measurement, self.display_tz),
            dispatch,
            span,
            state: AtomicU8::new(CONNECTED),
        })
    }
}
