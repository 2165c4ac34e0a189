use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use tickstore_types::{ErrorKind, TimeRange};

fn utc(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

#[test]
fn local_strings_are_interpreted_in_the_given_zone() {
    let r = TimeRange::from_local_strings(
        "2023-01-01T03:00:00",
        "2023-01-02T03:00:00",
        chrono_tz::Europe::Moscow,
    )
    .unwrap();
    assert_eq!(r.start, utc("2023-01-01T00:00:00Z"));
    assert_eq!(r.end, utc("2023-01-02T00:00:00Z"));
    assert_eq!(r.locale, chrono_tz::Europe::Moscow);
    assert_eq!(r.duration(), TimeDelta::hours(24));
}

#[test]
fn unparsable_bounds_name_the_failing_side() {
    let err = TimeRange::from_local_strings("yesterday", "2023-01-02T00:00:00", Tz::UTC)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArg);
    assert!(err.to_string().contains("start"));

    let err = TimeRange::from_local_strings("2023-01-02T00:00:00", "2023-01-02", Tz::UTC)
        .unwrap_err();
    assert!(err.to_string().contains("end"));
}

#[test]
fn nonexistent_local_time_is_rejected() {
    // 02:30 on 2023-03-12 is skipped by the US spring-forward transition.
    let err = TimeRange::from_local_strings(
        "2023-03-12T02:30:00",
        "2023-03-12T05:00:00",
        chrono_tz::America::New_York,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArg);
}

#[test]
fn contains_inclusive_includes_both_bounds() {
    let r = TimeRange::new(
        utc("2023-01-01T00:00:00Z"),
        utc("2023-01-01T01:00:00Z"),
        Tz::UTC,
    );
    assert!(r.contains_inclusive(r.start));
    assert!(r.contains_inclusive(r.end));
    assert!(r.contains_inclusive(utc("2023-01-01T00:30:00Z")));
    assert!(!r.contains_inclusive(utc("2023-01-01T01:00:01Z")));
    assert!(!r.contains_inclusive(utc("2022-12-31T23:59:59Z")));
}

#[test]
fn inverted_range_has_negative_duration() {
    let r = TimeRange::new(
        utc("2023-01-02T00:00:00Z"),
        utc("2023-01-01T00:00:00Z"),
        Tz::UTC,
    );
    assert!(r.duration() < TimeDelta::zero());
}
