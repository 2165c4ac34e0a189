use crate::{Span, TimeRange};

const HOUR_SECS: f64 = 3_600.0;

/// Pick the bucket width for a chart covering `range`.
///
/// Narrow ranges get fine buckets and wide ranges coarse ones, so a chart
/// stays around a few dozen candles regardless of the window. Ranges with a
/// non-positive duration fall back to [`Span::D1`].
#[must_use]
pub fn span_for(range: &TimeRange) -> Span {
    let d = range.duration();
    #[allow(clippy::cast_precision_loss)]
    let secs = d.num_seconds() as f64 + f64::from(d.subsec_nanos()) / 1e9;
    span_for_hours(secs / HOUR_SECS)
}

/// Pick the bucket width for a window of `hours` (fractional) hours.
///
/// Bracket bounds are open on both sides. A duration that lands exactly on a
/// bound, or is not positive, selects [`Span::D1`].
#[must_use]
pub fn span_for_hours(hours: f64) -> Span {
    match hours {
        d if d > 0.0 && d < 4.0 => Span::M15,
        d if d > 4.0 && d < 25.0 => Span::H1,
        d if d > 25.0 && d < 169.0 => Span::H6,
        d if d > 169.0 && d < 755.0 => Span::D1,
        d if d > 755.0 && d < 2263.0 => Span::D3,
        d if d > 2263.0 && d < 4525.0 => Span::D6,
        d if d > 4525.0 && d < 9048.0 => Span::D12,
        d if d > 9048.0 => Span::W4,
        _ => Span::D1,
    }
}
