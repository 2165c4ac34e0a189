use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Offset, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::sync::Mutex;

use tickstore_core::query::{MARKET_TAG, PRICE_FIELD};
use tickstore_core::{
    FieldValue, Point, Query, QueryKind, Row, Scalar, Span, TickstoreError, TimeSeriesBackend,
};

#[derive(Debug, Clone)]
struct Stored {
    database: String,
    point: Point,
    at: DateTime<Utc>,
}

#[derive(Default)]
struct Store {
    points: Vec<Stored>,
    closed: bool,
}

/// A backend that keeps every point in memory and evaluates queries itself.
///
/// Points written without a timestamp are stamped with the current time.
/// Chart queries are bucketed the same way the real store does it: buckets
/// are aligned to the query timezone, empty buckets are omitted, and rows are
/// returned newest first with timestamps rendered in that timezone.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    store: Arc<Mutex<Store>>,
}

impl InMemoryBackend {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points held across all databases.
    pub async fn len(&self) -> usize {
        self.store.lock().await.points.len()
    }

    /// Whether no point has been written yet.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether `close` has been called.
    pub async fn is_closed(&self) -> bool {
        self.store.lock().await.closed
    }
}

#[async_trait]
impl TimeSeriesBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "tickstore-memory"
    }

    async fn write(&self, point: &Point, database: &str) -> Result<(), TickstoreError> {
        let mut store = self.store.lock().await;
        if store.closed {
            return Err(TickstoreError::backend(self.name(), "connection closed"));
        }
        let at = point.timestamp.unwrap_or_else(Utc::now);
        store.points.push(Stored {
            database: database.to_string(),
            point: point.clone(),
            at,
        });
        Ok(())
    }

    async fn query(&self, query: &Query, database: &str) -> Result<Vec<Row>, TickstoreError> {
        let store = self.store.lock().await;
        if store.closed {
            return Err(TickstoreError::backend(self.name(), "connection closed"));
        }
        let mut samples: Vec<(DateTime<Utc>, f64)> = store
            .points
            .iter()
            .filter(|s| s.database == database && s.point.measurement == query.measurement())
            .filter(|s| s.point.tags.get(MARKET_TAG).map(String::as_str) == Some(query.market()))
            .filter_map(|s| price_of(&s.point).map(|p| (s.at, p)))
            .collect();
        drop(store);
        samples.sort_by_key(|(at, _)| *at);

        match query.kind() {
            QueryKind::Latest => Ok(samples
                .last()
                .map(|(at, price)| vec![vec![Scalar::text(utc_text(*at)), number(*price)]])
                .unwrap_or_default()),
            QueryKind::Chart {
                start,
                end,
                span,
                tz,
            } => {
                samples.retain(|(at, _)| start <= at && at <= end);
                Ok(aggregate(&samples, *span, *tz))
            }
            _ => Err(TickstoreError::backend(
                self.name(),
                format!("unsupported query: {query}"),
            )),
        }
    }

    async fn close(&self) -> Result<(), TickstoreError> {
        self.store.lock().await.closed = true;
        Ok(())
    }
}

fn price_of(point: &Point) -> Option<f64> {
    match point.fields.get(PRICE_FIELD)? {
        FieldValue::Float(f) => Some(*f),
        #[allow(clippy::cast_precision_loss)]
        FieldValue::Integer(i) => Some(*i as f64),
        FieldValue::Bool(_) | FieldValue::Text(_) => None,
    }
}

/// Start of the `span` bucket containing `ts`, aligned to local time in `tz`.
fn bucket_of(ts: DateTime<Utc>, span: Span, tz: Tz) -> DateTime<Utc> {
    let offset = i64::from(
        tz.offset_from_utc_datetime(&ts.naive_utc())
            .fix()
            .local_minus_utc(),
    );
    let local = ts.timestamp() + offset;
    let start = local - local.rem_euclid(span.seconds()) - offset;
    DateTime::from_timestamp(start, 0).unwrap_or(ts)
}

struct BucketAgg {
    open: f64,
    close: f64,
    low: f64,
    high: f64,
}

/// Group time-sorted samples into buckets; newest bucket first.
fn aggregate(samples: &[(DateTime<Utc>, f64)], span: Span, tz: Tz) -> Vec<Row> {
    let mut buckets: BTreeMap<DateTime<Utc>, BucketAgg> = BTreeMap::new();
    for &(at, price) in samples {
        buckets
            .entry(bucket_of(at, span, tz))
            .and_modify(|b| {
                b.close = price;
                b.low = b.low.min(price);
                b.high = b.high.max(price);
            })
            .or_insert(BucketAgg {
                open: price,
                close: price,
                low: price,
                high: price,
            });
    }
    buckets
        .into_iter()
        .rev()
        .map(|(start, b)| {
            vec![
                Scalar::text(
                    start
                        .with_timezone(&tz)
                        .to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                number(b.open),
                number(b.close),
                number(b.low),
                number(b.high),
            ]
        })
        .collect()
}

fn number(v: f64) -> Scalar {
    Scalar::number(v.to_string())
}

fn utc_text(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
