//! Reference-zone time keeping
//!
//! Every "day" in the game is a calendar day in one fixed reference zone,
//! regardless of where the player is. Stored timestamps are reference
//! wall-clock milliseconds: the zone's local date and time encoded as if they
//! were UTC. Under that encoding the UTC calendar date of a stamp is its
//! reference-zone date, and truncating to UTC midnight lands on the
//! reference-zone midnight.

use chrono::{DateTime, Datelike, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;
use std::cell::Cell;

/// Source of the current instant.
pub trait Clock {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Wall clock of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and scripted runs.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, delta: TimeDelta) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_utc(&self) -> DateTime<Utc> {
        (**self).now_utc()
    }
}

/// The zone that decides where one game day ends and the next begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceZone(Tz);

impl Default for ReferenceZone {
    fn default() -> Self {
        Self(chrono_tz::America::New_York)
    }
}

impl ReferenceZone {
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self(tz)
    }

    #[must_use]
    pub const fn tz(self) -> Tz {
        self.0
    }

    /// Reference wall-clock milliseconds for `instant`.
    #[must_use]
    pub fn wall_clock_ms(self, instant: DateTime<Utc>) -> i64 {
        instant
            .with_timezone(&self.0)
            .naive_local()
            .and_utc()
            .timestamp_millis()
    }

    /// Daily answer key, `dd_mm_yy` in the reference zone.
    #[must_use]
    pub fn date_key(self, instant: DateTime<Utc>) -> String {
        instant.with_timezone(&self.0).format("%d_%m_%y").to_string()
    }

    /// Reference date packed as `yyyymmdd`.
    #[must_use]
    pub fn day_number(self, instant: DateTime<Utc>) -> u32 {
        let local = instant.with_timezone(&self.0);
        let year = u32::try_from(local.year()).unwrap_or(0);
        year * 10_000 + local.month() * 100 + local.day()
    }
}

/// Whether two wall-clock stamps fall on the same reference day.
#[must_use]
pub fn same_day(a_ms: i64, b_ms: i64) -> bool {
    match (
        DateTime::from_timestamp_millis(a_ms),
        DateTime::from_timestamp_millis(b_ms),
    ) {
        (Some(a), Some(b)) => a.date_naive() == b.date_naive(),
        _ => false,
    }
}

/// Truncate a wall-clock stamp to midnight (UTC fields zeroed).
#[must_use]
pub fn truncate_to_midnight(ms: i64) -> i64 {
    DateTime::from_timestamp_millis(ms).map_or(ms, |dt| {
        dt.date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp_millis()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn wall_clock_follows_eastern_offsets() {
        let zone = ReferenceZone::default();
        // EDT is UTC-4 in October.
        let summer = utc(2026, 10, 18, 14, 0);
        assert_eq!(
            zone.wall_clock_ms(summer),
            utc(2026, 10, 18, 10, 0).timestamp_millis()
        );
        // EST is UTC-5 in January.
        let winter = utc(2026, 1, 10, 14, 0);
        assert_eq!(
            zone.wall_clock_ms(winter),
            utc(2026, 1, 10, 9, 0).timestamp_millis()
        );
    }

    #[test]
    fn early_utc_morning_is_still_previous_reference_day() {
        let zone = ReferenceZone::default();
        let late_evening_eastern = utc(2026, 10, 19, 2, 30);
        assert_eq!(zone.date_key(late_evening_eastern), "18_10_26");
        assert_eq!(zone.day_number(late_evening_eastern), 20_261_018);
    }

    #[test]
    fn same_day_compares_wall_clock_dates() {
        let zone = ReferenceZone::default();
        let morning = zone.wall_clock_ms(utc(2026, 10, 18, 11, 0));
        let night = zone.wall_clock_ms(utc(2026, 10, 19, 3, 59));
        let next = zone.wall_clock_ms(utc(2026, 10, 19, 4, 0));
        assert!(same_day(morning, night));
        assert!(!same_day(morning, next));
        assert!(!same_day(0, morning));
    }

    #[test]
    fn midnight_truncation_stays_on_the_same_day() {
        let zone = ReferenceZone::default();
        let stamp = zone.wall_clock_ms(utc(2026, 10, 19, 3, 0));
        let midnight = truncate_to_midnight(stamp);
        assert!(same_day(stamp, midnight));
        assert_eq!(midnight, utc(2026, 10, 18, 0, 0).timestamp_millis());
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(utc(2026, 10, 18, 12, 0));
        clock.advance(TimeDelta::days(1));
        assert_eq!(clock.now_utc(), utc(2026, 10, 19, 12, 0));
    }
}
