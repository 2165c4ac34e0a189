//! Bucket widths used to aggregate raw observations into candles.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Width of a chart bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Span {
    /// 15 minutes.
    M15,
    /// 1 hour.
    H1,
    /// 6 hours.
    H6,
    /// 1 day.
    D1,
    /// 3 days.
    D3,
    /// 6 days.
    D6,
    /// 12 days.
    D12,
    /// 4 weeks.
    W4,
}

impl Span {
    /// Every span, narrowest first.
    pub const ALL: [Self; 8] = [
        Self::M15,
        Self::H1,
        Self::H6,
        Self::D1,
        Self::D3,
        Self::D6,
        Self::D12,
        Self::W4,
    ];

    /// Duration literal understood by the backend's `GROUP BY time(..)` clause.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::M15 => "15m",
            Self::H1 => "1h",
            Self::H6 => "6h",
            Self::D1 => "1d",
            Self::D3 => "3d",
            Self::D6 => "6d",
            Self::D12 => "12d",
            Self::W4 => "4w",
        }
    }

    /// Bucket width in seconds.
    #[must_use]
    pub const fn seconds(self) -> i64 {
        const HOUR: i64 = 3_600;
        const DAY: i64 = 24 * HOUR;
        match self {
            Self::M15 => 15 * 60,
            Self::H1 => HOUR,
            Self::H6 => 6 * HOUR,
            Self::D1 => DAY,
            Self::D3 => 3 * DAY,
            Self::D6 => 6 * DAY,
            Self::D12 => 12 * DAY,
            Self::W4 => 28 * DAY,
        }
    }

    /// Bucket width as a `TimeDelta`.
    #[must_use]
    pub fn width(self) -> TimeDelta {
        TimeDelta::seconds(self.seconds())
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
