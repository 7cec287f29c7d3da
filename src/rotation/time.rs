//! Time sources and date-mode conversions.
//!
//! The orchestrator reads "now" through [`TimeSource`] so ticks can be driven
//! by a fixed clock in tests.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use parking_lot::Mutex;

use super::date_format::render;
use crate::config::DateMode;

/// Source of the current instant.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The host clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually driven clock.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: chrono::Duration) {
        let mut now = self.now.lock();
        *now += delta;
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Wall-clock reading of `now` in the given date mode.
pub fn wall_clock(now: DateTime<Utc>, mode: DateMode) -> NaiveDateTime {
    match mode {
        DateMode::System => now.with_timezone(&Local).naive_local(),
        DateMode::Utc => now.naive_utc(),
    }
}

/// Formats `now` for an artifact name in the given date mode.
pub fn stamp(now: DateTime<Utc>, mode: DateMode, format: &str) -> String {
    match mode {
        DateMode::System => render(format, &now.with_timezone(&Local)),
        DateMode::Utc => render(format, &now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(chrono::Duration::hours(25));
        assert_eq!(clock.now(), Utc.with_ymd_and_hms(2025, 1, 2, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_manual_clock_set_can_go_backwards() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
        let earlier = Utc.with_ymd_and_hms(2025, 2, 28, 8, 30, 0).unwrap();
        clock.set(earlier);
        assert_eq!(clock.now(), earlier);
    }

    #[test]
    fn test_utc_stamp_and_wall_clock() {
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 58).unwrap();
        assert_eq!(stamp(now, DateMode::Utc, "YYYY-MM-DD"), "2025-06-30");
        assert_eq!(wall_clock(now, DateMode::Utc), now.naive_utc());
    }

    #[test]
    fn test_system_stamp_uses_local_offset() {
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap();
        let expected = now.with_timezone(&Local).format("%Y-%m-%d %H").to_string();
        assert_eq!(stamp(now, DateMode::System, "YYYY-MM-DD HH"), expected);
    }
}
