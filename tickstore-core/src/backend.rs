use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::TickstoreError;
use crate::query::Query;

/// A backend-native scalar as it appears in a result row.
///
/// Numbers keep the exact text the backend sent so that decimal decoding never
/// goes through a binary float.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scalar {
    /// Missing value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value, as its exact textual representation.
    Number(String),
    /// String value (timestamps arrive as strings).
    Text(String),
}

impl Scalar {
    /// Numeric scalar from its textual representation.
    pub fn number(raw: impl Into<String>) -> Self {
        Self::Number(raw.into())
    }

    /// String scalar.
    pub fn text(raw: impl Into<String>) -> Self {
        Self::Text(raw.into())
    }

    /// The value rendered for diagnostics.
    #[must_use]
    pub fn raw(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(s) | Self::Text(s) => s.clone(),
        }
    }
}

/// One result row, indexed positionally per query shape.
pub type Row = Vec<Scalar>;

/// Value of a point field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// 64-bit float.
    Float(f64),
    /// Signed integer.
    Integer(i64),
    /// Boolean.
    Bool(bool),
    /// String.
    Text(String),
}

/// A single time-stamped point to write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Measurement the point belongs to.
    pub measurement: String,
    /// Indexed tags (partition keys).
    pub tags: BTreeMap<String, String>,
    /// Field values.
    pub fields: BTreeMap<String, FieldValue>,
    /// Point timestamp; `None` lets the backend assign its own write time.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Point {
    /// Start a point for `measurement` with no tags or fields.
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp: None,
        }
    }

    /// Add a tag.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add a field.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Pin the point to an explicit timestamp.
    #[must_use]
    pub const fn at(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }
}

/// Contract every time-series store must satisfy.
///
/// Implementations must be safe for concurrent use: the service shares one
/// handle across all callers without extra locking.
#[async_trait]
pub trait TimeSeriesBackend: Send + Sync {
    /// A stable identifier used to tag errors and log events (e.g. "tickstore-influx").
    fn name(&self) -> &'static str;

    /// Write one point into `database`.
    async fn write(&self, point: &Point, database: &str) -> Result<(), TickstoreError>;

    /// Execute `query` against `database` and return the rows of the first series.
    ///
    /// A query that matches nothing returns an empty vector, not an error.
    async fn query(&self, query: &Query, database: &str) -> Result<Vec<Row>, TickstoreError>;

    /// Release the connection. Further calls are not expected.
    async fn close(&self) -> Result<(), TickstoreError>;
}
