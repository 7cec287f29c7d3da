//! Time-based ("forced") rotation clock.
//!
//! The clock remembers the start of the current interval window, truncated to
//! the policy's calendar unit. A rotation is due once the truncated current
//! time is `interval_count` units past that start; the window then jumps to
//! the current truncated time.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::config::{IntervalUnit, RotationPolicy};

/// Tracks interval boundaries for forced rotation.
#[derive(Debug, Clone)]
pub struct RotationClock {
    window_start: NaiveDateTime,
}

impl RotationClock {
    /// Starts a window at `now` truncated to `unit`.
    pub fn new(now: NaiveDateTime, unit: IntervalUnit) -> Self {
        Self {
            window_start: truncate(now, unit),
        }
    }

    /// Start of the current window.
    pub const fn window_start(&self) -> NaiveDateTime {
        self.window_start
    }

    /// Returns true if a forced rotation is due, advancing the window.
    ///
    /// Call at most once per tick: a second call in the same tick would see
    /// the freshly advanced window and silently skip a rotation.
    pub fn is_due(&mut self, now: NaiveDateTime, policy: &RotationPolicy) -> bool {
        let now = truncate(now, policy.interval_unit);
        let elapsed = units_between(self.window_start, now, policy.interval_unit);

        if elapsed >= i64::from(policy.interval_count) {
            tracing::debug!(
                previous = %self.window_start,
                next = %now,
                unit = %policy.interval_unit,
                "Rotation interval elapsed"
            );
            self.window_start = now;
            true
        } else {
            false
        }
    }
}

/// Truncates `at` to the start of its `unit`.
pub fn truncate(at: NaiveDateTime, unit: IntervalUnit) -> NaiveDateTime {
    let date = at.date();
    match unit {
        IntervalUnit::Second => at_time(date, at.hour(), at.minute(), at.second()),
        IntervalUnit::Minute => at_time(date, at.hour(), at.minute(), 0),
        IntervalUnit::Hour => at_time(date, at.hour(), 0, 0),
        IntervalUnit::Day => date.and_time(NaiveTime::MIN),
        IntervalUnit::Week => {
            let back = chrono::Days::new(u64::from(date.weekday().num_days_from_monday()));
            date.checked_sub_days(back)
                .unwrap_or(date)
                .and_time(NaiveTime::MIN)
        },
        IntervalUnit::Month => first_of_month(date, date.month()).and_time(NaiveTime::MIN),
        IntervalUnit::Quarter => {
            let month = (date.month0() / 3) * 3 + 1;
            first_of_month(date, month).and_time(NaiveTime::MIN)
        },
        IntervalUnit::Year => first_of_month(date, 1).and_time(NaiveTime::MIN),
    }
}

/// Whole `unit`s from `from` to `to`; both must already be truncated.
pub fn units_between(from: NaiveDateTime, to: NaiveDateTime, unit: IntervalUnit) -> i64 {
    let delta = to - from;
    let months = || {
        (i64::from(to.year()) * 12 + i64::from(to.month0()))
            - (i64::from(from.year()) * 12 + i64::from(from.month0()))
    };
    match unit {
        IntervalUnit::Second => delta.num_seconds(),
        IntervalUnit::Minute => delta.num_minutes(),
        IntervalUnit::Hour => delta.num_hours(),
        IntervalUnit::Day => delta.num_days(),
        IntervalUnit::Week => delta.num_days() / 7,
        IntervalUnit::Month => months(),
        IntervalUnit::Quarter => months() / 3,
        IntervalUnit::Year => i64::from(to.year()) - i64::from(from.year()),
    }
}

fn at_time(date: NaiveDate, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, minute, second)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

fn first_of_month(date: NaiveDate, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_settings, parse};
    use std::collections::HashMap;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn policy(unit: &str, interval: &str) -> RotationPolicy {
        let mut raw = HashMap::new();
        raw.insert("interval_unit".to_string(), unit.to_string());
        raw.insert("interval".to_string(), interval.to_string());
        parse(&raw, &default_settings()).unwrap()
    }

    #[test]
    fn test_truncate_units() {
        let at = dt(2025, 8, 14, 13, 47, 22);
        assert_eq!(truncate(at, IntervalUnit::Second), at);
        assert_eq!(truncate(at, IntervalUnit::Minute), dt(2025, 8, 14, 13, 47, 0));
        assert_eq!(truncate(at, IntervalUnit::Hour), dt(2025, 8, 14, 13, 0, 0));
        assert_eq!(truncate(at, IntervalUnit::Day), dt(2025, 8, 14, 0, 0, 0));
        // 2025-08-14 is a Thursday.
        assert_eq!(truncate(at, IntervalUnit::Week), dt(2025, 8, 11, 0, 0, 0));
        assert_eq!(truncate(at, IntervalUnit::Month), dt(2025, 8, 1, 0, 0, 0));
        assert_eq!(truncate(at, IntervalUnit::Quarter), dt(2025, 7, 1, 0, 0, 0));
        assert_eq!(truncate(at, IntervalUnit::Year), dt(2025, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_not_due_within_window() {
        let policy = policy("day", "1");
        let mut clock = RotationClock::new(dt(2025, 1, 10, 8, 0, 0), policy.interval_unit);

        for hour in 9..24 {
            assert!(!clock.is_due(dt(2025, 1, 10, hour, 30, 0), &policy));
        }
        assert_eq!(clock.window_start(), dt(2025, 1, 10, 0, 0, 0));
    }

    #[test]
    fn test_due_once_per_boundary() {
        let policy = policy("day", "1");
        let mut clock = RotationClock::new(dt(2025, 1, 10, 23, 0, 0), policy.interval_unit);

        assert!(clock.is_due(dt(2025, 1, 11, 0, 0, 50), &policy));
        assert_eq!(clock.window_start(), dt(2025, 1, 11, 0, 0, 0));
        assert!(!clock.is_due(dt(2025, 1, 11, 0, 1, 40), &policy));
        assert!(!clock.is_due(dt(2025, 1, 11, 23, 59, 59), &policy));
        assert!(clock.is_due(dt(2025, 1, 12, 0, 0, 10), &policy));
    }

    #[test]
    fn test_interval_count_respected() {
        let policy = policy("hour", "3");
        let mut clock = RotationClock::new(dt(2025, 1, 10, 8, 15, 0), policy.interval_unit);

        assert!(!clock.is_due(dt(2025, 1, 10, 9, 0, 0), &policy));
        assert!(!clock.is_due(dt(2025, 1, 10, 10, 59, 0), &policy));
        assert!(clock.is_due(dt(2025, 1, 10, 11, 0, 0), &policy));
        assert_eq!(clock.window_start(), dt(2025, 1, 10, 11, 0, 0));
    }

    #[test]
    fn test_window_replaced_not_incremented() {
        let policy = policy("day", "1");
        let mut clock = RotationClock::new(dt(2025, 1, 1, 12, 0, 0), policy.interval_unit);

        // A long gap elapses several windows but fires once.
        assert!(clock.is_due(dt(2025, 1, 5, 12, 0, 0), &policy));
        assert_eq!(clock.window_start(), dt(2025, 1, 5, 0, 0, 0));
        assert!(!clock.is_due(dt(2025, 1, 5, 13, 0, 0), &policy));
    }

    #[test]
    fn test_month_boundaries() {
        let policy = policy("month", "1");
        let mut clock = RotationClock::new(dt(2024, 12, 31, 23, 0, 0), policy.interval_unit);

        assert!(clock.is_due(dt(2025, 1, 1, 0, 0, 1), &policy));
        assert!(!clock.is_due(dt(2025, 1, 31, 0, 0, 0), &policy));
        assert!(clock.is_due(dt(2025, 2, 1, 0, 0, 0), &policy));
    }

    #[test]
    fn test_clock_going_backwards_is_not_due() {
        let policy = policy("minute", "1");
        let mut clock = RotationClock::new(dt(2025, 1, 10, 8, 30, 0), policy.interval_unit);
        assert!(!clock.is_due(dt(2025, 1, 10, 8, 0, 0), &policy));
        assert_eq!(clock.window_start(), dt(2025, 1, 10, 8, 30, 0));
    }

    #[test]
    fn test_units_between_quarters_and_years() {
        let from = dt(2024, 10, 1, 0, 0, 0);
        let to = dt(2025, 4, 1, 0, 0, 0);
        assert_eq!(units_between(from, to, IntervalUnit::Quarter), 2);
        assert_eq!(
            units_between(dt(2023, 1, 1, 0, 0, 0), dt(2025, 1, 1, 0, 0, 0), IntervalUnit::Year),
            2
        );
    }
}
