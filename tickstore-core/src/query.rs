//! Structured queries and their InfluxQL rendering.
//!
//! User-supplied values never appear in the command text: the market name and
//! the range bounds travel as bound parameters (`$market`, `$start`, `$end`)
//! next to the command.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::decode::{CANDLE_COLUMNS, TICKER_COLUMNS};
use crate::{DEFAULT_DISPLAY_TZ, DEFAULT_MEASUREMENT, Span, TimeRange};

/// Field holding the observed price.
pub const PRICE_FIELD: &str = "price";

/// Tag holding the market identifier.
pub const MARKET_TAG: &str = "market";

/// What a query asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum QueryKind {
    /// Most recent price of one market.
    Latest,
    /// Bucketed OHLC aggregation over a closed range.
    Chart {
        /// Inclusive lower bound.
        start: DateTime<Utc>,
        /// Inclusive upper bound.
        end: DateTime<Utc>,
        /// Bucket width.
        span: Span,
        /// Timezone buckets are aligned to and timestamps rendered in.
        tz: Tz,
    },
}

/// A backend query for one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    measurement: String,
    market: String,
    kind: QueryKind,
}

impl Query {
    /// Measurement the query reads from.
    #[must_use]
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    /// Market the query is restricted to.
    #[must_use]
    pub fn market(&self) -> &str {
        &self.market
    }

    /// Query shape.
    #[must_use]
    pub const fn kind(&self) -> &QueryKind {
        &self.kind
    }

    /// Column names of every row this query yields, in order.
    #[must_use]
    pub const fn columns(&self) -> &'static [&'static str] {
        match self.kind {
            QueryKind::Latest => &TICKER_COLUMNS,
            QueryKind::Chart { .. } => &CANDLE_COLUMNS,
        }
    }

    /// InfluxQL command text with placeholders for every user-supplied value.
    #[must_use]
    pub fn command(&self) -> String {
        let measurement = quote_ident(&self.measurement);
        let price = quote_ident(PRICE_FIELD);
        let market = quote_ident(MARKET_TAG);
        match &self.kind {
            QueryKind::Latest => {
                format!("SELECT LAST({price}) FROM {measurement} WHERE {market} = $market")
            }
            QueryKind::Chart { span, tz, .. } => format!(
                "SELECT FIRST({price}), LAST({price}), MIN({price}), MAX({price}) \
                 FROM {measurement} \
                 WHERE {market} = $market AND time >= $start AND time <= $end \
                 GROUP BY time({span}) fill(none) \
                 ORDER BY time DESC tz('{}')",
                tz.name()
            ),
        }
    }

    /// Values bound to the placeholders in [`Query::command`].
    #[must_use]
    pub fn params(&self) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("market", self.market.clone());
        if let QueryKind::Chart { start, end, .. } = &self.kind {
            params.insert("start", rfc3339(*start));
            params.insert("end", rfc3339(*end));
        }
        params
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command())
    }
}

/// Builds queries against one measurement with a fixed display timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    measurement: String,
    tz: Tz,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MEASUREMENT, DEFAULT_DISPLAY_TZ)
    }
}

impl QueryBuilder {
    /// Builder for `measurement`, aligning chart buckets to `tz`.
    pub fn new(measurement: impl Into<String>, tz: Tz) -> Self {
        Self {
            measurement: measurement.into(),
            tz,
        }
    }

    /// Measurement every query targets.
    #[must_use]
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    /// Most recent price of `market`.
    #[must_use]
    pub fn latest(&self, market: &str) -> Query {
        Query {
            measurement: self.measurement.clone(),
            market: market.to_string(),
            kind: QueryKind::Latest,
        }
    }

    /// OHLC candles of `market` over `range`, one per `span` bucket.
    #[must_use]
    pub fn chart(&self, market: &str, range: &TimeRange, span: Span) -> Query {
        Query {
            measurement: self.measurement.clone(),
            market: market.to_string(),
            kind: QueryKind::Chart {
                start: range.start,
                end: range.end,
                span,
                tz: self.tz,
            },
        }
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('\\', "\\\\").replace('"', "\\\""))
}

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
