use chrono::{DateTime, TimeDelta, Utc};
use proptest::prelude::*;
use tickstore_core::{DEFAULT_DISPLAY_TZ, Span, TimeRange, span_for, span_for_hours};

fn range_of(duration: TimeDelta) -> TimeRange {
    let start = DateTime::<Utc>::from_timestamp(1_672_531_200, 0).unwrap();
    TimeRange::new(start, start + duration, DEFAULT_DISPLAY_TZ)
}

#[test]
fn typical_windows_pick_expected_span() {
    assert_eq!(span_for(&range_of(TimeDelta::hours(2))), Span::M15);
    assert_eq!(span_for(&range_of(TimeDelta::hours(10))), Span::H1);
    assert_eq!(span_for(&range_of(TimeDelta::hours(48))), Span::H6);
    assert_eq!(span_for(&range_of(TimeDelta::hours(200))), Span::D1);
    assert_eq!(span_for(&range_of(TimeDelta::days(60))), Span::D3);
    assert_eq!(span_for(&range_of(TimeDelta::days(120))), Span::D6);
    assert_eq!(span_for(&range_of(TimeDelta::days(300))), Span::D12);
    assert_eq!(span_for(&range_of(TimeDelta::days(400))), Span::W4);
}

#[test]
fn exact_bracket_bounds_fall_back_to_one_day() {
    for bound in [4, 25, 169, 755, 2263, 4525, 9048] {
        assert_eq!(
            span_for(&range_of(TimeDelta::hours(bound))),
            Span::D1,
            "bound {bound}h"
        );
    }
}

#[test]
fn non_positive_durations_fall_back_to_one_day() {
    assert_eq!(span_for(&range_of(TimeDelta::zero())), Span::D1);
    assert_eq!(span_for(&range_of(TimeDelta::hours(-3))), Span::D1);
    assert_eq!(span_for_hours(-0.5), Span::D1);
}

#[test]
fn sub_hour_precision_is_kept() {
    // 3h59m is still a short window; 4h01m is not.
    assert_eq!(span_for(&range_of(TimeDelta::minutes(239))), Span::M15);
    assert_eq!(span_for(&range_of(TimeDelta::minutes(241))), Span::H1);
    assert_eq!(span_for(&range_of(TimeDelta::milliseconds(1))), Span::M15);
    assert_eq!(span_for(&range_of(TimeDelta::microseconds(500))), Span::M15);
    assert_eq!(span_for(&range_of(TimeDelta::nanoseconds(1))), Span::M15);
    assert_eq!(span_for(&range_of(TimeDelta::microseconds(-500))), Span::D1);
}

const BRACKETS: [(f64, f64, Span); 7] = [
    (0.0, 4.0, Span::M15),
    (4.0, 25.0, Span::H1),
    (25.0, 169.0, Span::H6),
    (169.0, 755.0, Span::D1),
    (755.0, 2263.0, Span::D3),
    (2263.0, 4525.0, Span::D6),
    (4525.0, 9048.0, Span::D12),
];

proptest! {
    #[test]
    fn interior_of_each_bracket_maps_to_its_span(idx in 0usize..BRACKETS.len(), t in 0.001f64..0.999) {
        let (lo, hi, span) = BRACKETS[idx];
        let hours = lo + (hi - lo) * t;
        prop_assert_eq!(span_for_hours(hours), span);
    }

    #[test]
    fn beyond_last_bound_is_four_weeks(hours in 9048.001f64..1.0e7) {
        prop_assert_eq!(span_for_hours(hours), Span::W4);
    }

    #[test]
    fn span_never_shrinks_as_window_grows(a in 0.01f64..20_000.0, b in 0.01f64..20_000.0) {
        let bounds = [4.0, 25.0, 169.0, 755.0, 2263.0, 4525.0, 9048.0];
        prop_assume!(!bounds.contains(&a) && !bounds.contains(&b));
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(span_for_hours(lo) <= span_for_hours(hi));
    }
}
