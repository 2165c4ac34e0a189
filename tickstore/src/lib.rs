//! Tickstore records market price observations in a time-series store and
//! serves them back as latest prices and OHLC charts.
//!
//! Overview
//! - [`TimeSeriesService`] owns one backend handle and exposes `push_ticker`,
//!   `get_ticker`, `get_price_charts`, and `close`.
//! - Chart bucket widths follow the requested range: a two-hour window gets
//!   15-minute candles, a ten-hour window hourly ones, and so on up to four weeks.
//! - Every query runs behind a fault boundary that turns backend and decode
//!   failures into typed errors and logs them.
//! - Logging goes to a `tracing::Dispatch` injected at construction; the
//!   service never touches the global subscriber.
//!
//! Examples
//! ```rust,ignore
//! use tickstore::{config, telemetry, TimeSeriesService, TimeRange};
//!
//! let cfg = config::load_config_from_env()?;
//! let svc = tickstore::connect(&cfg)?;
//! let range = TimeRange::from_local_strings(
//!     "2023-01-01T00:00:00",
//!     "2023-01-01T10:00:00",
//!     cfg.timeseries.display_tz,
//! )?;
//! let candles = svc.get_price_charts("BTCUSD", &range).await?;
//! svc.close().await;
//! ```
#![warn(missing_docs)]

pub mod config;
mod guard;
mod service;
pub mod telemetry;

pub use guard::tag_err;
pub use service::{PriceStore, ServiceState, TimeSeriesService, TimeSeriesServiceBuilder};
pub use tickstore_core::*;

/// Build a service backed by InfluxDB from a loaded configuration.
///
/// Logs go to a subscriber built from `cfg.main.logger`.
///
/// # Errors
/// Returns `InvalidArg` when the influx address or database name is missing.
#[cfg(feature = "influx")]
pub fn connect(cfg: &AppConfig) -> Result<TimeSeriesService, TickstoreError> {
    let backend = tickstore_influx::InfluxBackend::from_config(&cfg.influx)?;
    TimeSeriesService::builder()
        .backend(std::sync::Arc::new(backend))
        .config(cfg)
        .dispatch(telemetry::dispatch_from_config(&cfg.main.logger))
        .build()
}
