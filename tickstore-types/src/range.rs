//! Query time ranges.

use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::TickstoreError;

/// Layout accepted by [`TimeRange::from_local_strings`].
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A closed time interval plus the timezone the caller expressed it in.
///
/// `start <= end` is expected but not enforced; ranges with a non-positive
/// duration are still accepted by chart queries and fall back to the default span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Inclusive upper bound.
    pub end: DateTime<Utc>,
    /// Timezone the bounds were expressed in by the caller.
    pub locale: Tz,
}

impl TimeRange {
    /// Build a range from two instants.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>, locale: Tz) -> Self {
        Self { start, end, locale }
    }

    /// Parse both bounds as wall-clock times (`YYYY-MM-DDTHH:MM:SS`) in `locale`.
    ///
    /// # Errors
    /// Returns `InvalidArg` naming the bound that failed to parse or that does
    /// not exist in `locale` (for example inside a DST gap).
    pub fn from_local_strings(start: &str, end: &str, locale: Tz) -> Result<Self, TickstoreError> {
        let start = parse_local(start, locale)
            .map_err(|e| TickstoreError::InvalidArg(format!("cannot parse start date: {e}")))?;
        let end = parse_local(end, locale)
            .map_err(|e| TickstoreError::InvalidArg(format!("cannot parse end date: {e}")))?;
        Ok(Self { start, end, locale })
    }

    /// `end - start`; negative when the bounds are inverted.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Whether `t` lies within the range, bounds included.
    #[must_use]
    pub fn contains_inclusive(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }
}

fn parse_local(raw: &str, tz: Tz) -> Result<DateTime<Utc>, String> {
    let naive = NaiveDateTime::parse_from_str(raw, LOCAL_TIME_FORMAT)
        .map_err(|e| format!("{raw:?}: {e}"))?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Ok(t.with_timezone(&Utc)),
        // Repeated wall-clock hour at a DST fall-back: take the earlier instant.
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(format!("{raw:?} does not exist in {tz}")),
    }
}
