//! tickstore-core
//!
//! The storage contract and the pure pieces of the tickstore service.
//!
//! - `backend`: the `TimeSeriesBackend` trait plus the point and row types it exchanges.
//! - `decode`: tolerant scalar and row decoders that report defects instead of panicking.
//! - `span`: adaptive bucket-width selection for chart ranges.
//! - `query`: structured queries rendered to InfluxQL with bound parameters.
#![warn(missing_docs)]

/// Backend contract and the values it reads and writes.
pub mod backend;
pub mod decode;
/// Chart bucket-width selection.
pub mod span;
pub mod query;

pub use backend::{FieldValue, Point, Row, Scalar, TimeSeriesBackend};
pub use decode::{
    decode_candle_row, decode_decimal, decode_ticker_row, decode_timestamp, decode_timestamp_with,
};
pub use query::{Query, QueryBuilder, QueryKind};
pub use span::{span_for, span_for_hours};
pub use tickstore_types::*;
