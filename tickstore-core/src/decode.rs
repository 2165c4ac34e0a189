//! Tolerant decoding of backend scalars and result rows.
//!
//! Scalar decoders never panic: any value that does not have the expected shape
//! is reported as a [`DecodeError`]. Row decoders examine every column and
//! collect all defects before giving up, so a single error lists everything
//! that was wrong with the row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::backend::Scalar;
use crate::{Candle, DecodeError, RowDefect, Ticker};

/// Column names of a latest-ticker row, in backend order.
pub const TICKER_COLUMNS: [&str; 2] = ["time", "price"];

/// Column names of a candle row, in backend order.
pub const CANDLE_COLUMNS: [&str; 5] = ["time", "open", "close", "low", "high"];

/// Decode a backend numeric scalar into an exact decimal.
///
/// Accepts numbers and strings holding a decimal literal (plain or scientific
/// notation). The text is parsed directly, never through a binary float.
///
/// # Errors
/// Returns `InvalidNumeric` when the scalar is not a number or its text is not
/// a valid decimal literal.
pub fn decode_decimal(raw: &Scalar) -> Result<Decimal, DecodeError> {
    let text = match raw {
        Scalar::Number(s) | Scalar::Text(s) => s.as_str(),
        other => {
            return Err(DecodeError::InvalidNumeric { raw: other.raw() });
        }
    };
    parse_decimal(text).ok_or_else(|| DecodeError::InvalidNumeric {
        raw: text.to_string(),
    })
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if let Ok(d) = Decimal::from_str_exact(text) {
        return Some(d);
    }
    if text.contains(['e', 'E']) {
        return Decimal::from_scientific(text).ok();
    }
    None
}

/// Decode an RFC 3339 timestamp string into a UTC instant.
///
/// # Errors
/// Returns `InvalidTimestamp` when the scalar is not a string or does not parse.
pub fn decode_timestamp(raw: &Scalar) -> Result<DateTime<Utc>, DecodeError> {
    let Scalar::Text(text) = raw else {
        return Err(DecodeError::InvalidTimestamp { raw: raw.raw() });
    };
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| DecodeError::InvalidTimestamp { raw: text.clone() })
}

/// Decode a timestamp string using an explicit `chrono` format.
///
/// The format must carry an offset (`%z` or `%:z`) so the instant is unambiguous.
///
/// # Errors
/// Returns `InvalidTimestamp` when the scalar is not a string or does not match `format`.
pub fn decode_timestamp_with(raw: &Scalar, format: &str) -> Result<DateTime<Utc>, DecodeError> {
    let Scalar::Text(text) = raw else {
        return Err(DecodeError::InvalidTimestamp { raw: raw.raw() });
    };
    DateTime::parse_from_str(text, format)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| DecodeError::InvalidTimestamp { raw: text.clone() })
}

/// Collects per-column decode failures for one row.
#[derive(Default)]
struct Defects(Vec<RowDefect>);

impl Defects {
    fn take<T>(&mut self, column: &str, decoded: Result<T, DecodeError>) -> Option<T> {
        match decoded {
            Ok(v) => Some(v),
            Err(error) => {
                self.0.push(RowDefect::Field {
                    column: column.to_string(),
                    error,
                });
                None
            }
        }
    }
}

fn check_width(row: &[Scalar], expected: usize) -> Result<(), Vec<RowDefect>> {
    if row.len() == expected {
        Ok(())
    } else {
        Err(vec![RowDefect::ColumnCount {
            expected,
            actual: row.len(),
        }])
    }
}

/// Decode a `[time, price]` row into a [`Ticker`].
///
/// # Errors
/// Returns every defect found: a column-count mismatch, or one entry per
/// column that failed to decode.
pub fn decode_ticker_row(row: &[Scalar]) -> Result<Ticker, Vec<RowDefect>> {
    check_width(row, TICKER_COLUMNS.len())?;
    let mut defects = Defects::default();
    let observed_at = defects.take(TICKER_COLUMNS[0], decode_timestamp(&row[0]));
    let price = defects.take(TICKER_COLUMNS[1], decode_decimal(&row[1]));
    match (observed_at, price) {
        (Some(observed_at), Some(price)) => Ok(Ticker { price, observed_at }),
        _ => Err(defects.0),
    }
}

/// Decode a `[time, open, close, low, high]` row into a [`Candle`].
///
/// # Errors
/// Returns every defect found: a column-count mismatch, or one entry per
/// column that failed to decode.
pub fn decode_candle_row(row: &[Scalar]) -> Result<Candle, Vec<RowDefect>> {
    check_width(row, CANDLE_COLUMNS.len())?;
    let mut defects = Defects::default();
    let bucket_start = defects.take(CANDLE_COLUMNS[0], decode_timestamp(&row[0]));
    let open = defects.take(CANDLE_COLUMNS[1], decode_decimal(&row[1]));
    let close = defects.take(CANDLE_COLUMNS[2], decode_decimal(&row[2]));
    let low = defects.take(CANDLE_COLUMNS[3], decode_decimal(&row[3]));
    let high = defects.take(CANDLE_COLUMNS[4], decode_decimal(&row[4]));
    match (bucket_start, open, close, low, high) {
        (Some(bucket_start), Some(open), Some(close), Some(low), Some(high)) => Ok(Candle {
            open,
            close,
            low,
            high,
            bucket_start,
        }),
        _ => Err(defects.0),
    }
}
