//! Tickstore value types, error types, and configuration primitives.
#![warn(missing_docs)]

mod config;
mod error;
mod market;
mod range;
mod span;

pub use config::{
    AppConfig, DEFAULT_DISPLAY_TZ, DEFAULT_MEASUREMENT, InfluxConfig, LoggerConfig, MainConfig,
    TimeSeriesConfig,
};
pub use error::{DecodeError, DecodeErrorKind, ErrorKind, RowDefect, TickstoreError};
pub use market::{Candle, Ticker};
pub use range::{LOCAL_TIME_FORMAT, TimeRange};
pub use span::Span;
