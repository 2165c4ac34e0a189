//! Price observations and OHLC aggregates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single price observation for a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Quoted price, kept exact.
    pub price: Decimal,
    /// When the price was observed.
    #[serde(rename = "datetime")]
    pub observed_at: DateTime<Utc>,
}

impl Ticker {
    /// Build a ticker from a price and its observation time.
    #[must_use]
    pub const fn new(price: Decimal, observed_at: DateTime<Utc>) -> Self {
        Self { price, observed_at }
    }
}

/// Open/close/low/high aggregate over one time bucket.
///
/// Prices are expected to be non-negative market quotes; this is a caller-level
/// expectation and is not checked when candles are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// First price in the bucket.
    pub open: Decimal,
    /// Last price in the bucket.
    pub close: Decimal,
    /// Lowest price in the bucket.
    pub low: Decimal,
    /// Highest price in the bucket.
    pub high: Decimal,
    /// Start of the bucket.
    #[serde(rename = "dt")]
    pub bucket_start: DateTime<Utc>,
}
