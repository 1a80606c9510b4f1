// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn ms(y: i64, mo: u32, d: u32, h: u32, mi: u32) -> u64 {
    // Minimal inverse of civil_from_days for test fixtures: brute-force
    // search outward from a rough estimate. Good enough for small test inputs.
    let approx_days = (y - 1970) * 365 + (mo as i64 - 1) * 30 + d as i64;
    for delta in -400..400 {
        let day = approx_days + delta;
        let (yy, mm, dd) = crate::id::civil_from_days(day);
        if yy == y && mm == mo && dd == d {
            return (day as u64) * 86_400_000 + (h as u64) * 3_600_000 + (mi as u64) * 60_000;
        }
    }
    panic!("could not locate civil date in test fixture");
}

#[test]
fn hourly_shorthand_expands() {
    let s = CronSchedule::parse("@hourly").unwrap();
    assert_eq!(s.source(), "@hourly");
}

#[test]
fn at_hourly_fires_exactly_on_minute_zero() {
    let s = CronSchedule::parse("@hourly").unwrap();
    // 2024-06-15 10:59:00 -> next fire must be 11:00:00, never 10:59.
    let after = ms(2024, 6, 15, 10, 59);
    let next = s.next_after(after, 0).unwrap();
    let expected = ms(2024, 6, 15, 11, 0);
    assert_eq!(next, expected);
}

#[test]
fn daily_schedule_no_catchup_across_clock_jump() {
    // S2: virtual clock at 2024-06-15T23:59:30, advance 90s.
    let s = CronSchedule::parse("@daily").unwrap();
    let after = ms(2024, 6, 15, 23, 59) + 30_000;
    let first = s.next_after(after, 0).unwrap();
    assert_eq!(first, ms(2024, 6, 16, 0, 0));

    let second = s.next_after(first, 0).unwrap();
    assert_eq!(second, ms(2024, 6, 17, 0, 0));
}

#[test]
fn ranges_steps_and_commas_parse() {
    let s = CronSchedule::parse("0,30 */6 1-15 * 1-5").unwrap();
    assert!(s.minutes.contains(&0) && s.minutes.contains(&30) && s.minutes.len() == 2);
    assert_eq!(s.hours, [0, 6, 12, 18].into_iter().collect());
    assert!(s.doms.contains(&1) && s.doms.contains(&15) && !s.doms.contains(&16));
    assert_eq!(s.dows, [1, 2, 3, 4, 5].into_iter().collect());
}

#[test]
fn day_of_week_zero_and_seven_both_mean_sunday() {
    let a = CronSchedule::parse("0 0 * * 0").unwrap();
    let b = CronSchedule::parse("0 0 * * 7").unwrap();
    assert_eq!(a.dows, b.dows);
}

#[test]
fn dom_and_dow_both_restricted_use_or_semantics() {
    // Fires on the 1st of the month OR every Monday.
    let s = CronSchedule::parse("0 0 1 * 1").unwrap();
    assert!(!s.dom_wildcard && !s.dow_wildcard);
    // 2024-06-01 is a Saturday (dom matches, dow doesn't) -> still fires.
    let before = ms(2024, 5, 31, 23, 0);
    let next = s.next_after(before, 0).unwrap();
    assert_eq!(next, ms(2024, 6, 1, 0, 0));
}

#[test]
fn malformed_field_count_is_rejected() {
    let err = CronSchedule::parse("0 0 * *").unwrap_err();
    assert!(err.field.is_none());
}

#[test]
fn invalid_minute_range_is_rejected() {
    let err = CronSchedule::parse("60 0 * * *").unwrap_err();
    assert_eq!(err.field.as_deref(), Some("minute"));
}

#[test]
fn zero_step_is_rejected() {
    let err = CronSchedule::parse("*/0 * * * *").unwrap_err();
    assert_eq!(err.field.as_deref(), Some("minute"));
}

#[test]
fn cron_purity_is_deterministic_and_monotonic() {
    let s = CronSchedule::parse("*/15 * * * *").unwrap();
    let t1 = ms(2024, 6, 15, 10, 0);
    let t2 = t1 + 3_600_000;
    let f1 = s.next_after(t1, 0).unwrap();
    let f2 = s.next_after(t2, 0).unwrap();
    assert!(f1 > t1);
    assert!(f2 > t2);
    assert!(f1 <= f2);
    // Determinism: same inputs, same outputs.
    assert_eq!(s.next_after(t1, 0), Some(f1));
}

#[cfg(feature = "test-support")]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn next_after_is_always_strictly_later(minute_expr in "(\\*|[0-5]?[0-9])") {
            let expr = format!("{minute_expr} * * * *");
            if let Ok(s) = CronSchedule::parse(&expr) {
                let after = 1_718_000_000_000u64;
                if let Some(next) = s.next_after(after, 0) {
                    prop_assert!(next > after);
                }
            }
        }
    }
}
