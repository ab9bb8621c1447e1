//! Wall-clock adapter.
//!
//! RULE: Nothing in the crate reads the system time directly.
//! The generator, the exporter and the log all ask a Clock, so a
//! FixedClock makes every timestamp reproducible in tests.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};

pub trait Clock: Send + Sync {
    /// Current local time, truncated to whole seconds.
    fn now(&self) -> NaiveDateTime;

    /// `now()` shifted by a signed number of days.
    fn offset_days(&self, days: i64) -> NaiveDateTime {
        self.now() + Duration::days(days)
    }

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The real local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        truncate_to_seconds(Local::now().naive_local())
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: NaiveDateTime,
}

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self { at: truncate_to_seconds(at) }
    }

    /// Midday on the given calendar date. Returns None for an invalid date.
    pub fn at_date(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.at
    }
}

fn truncate_to_seconds(t: NaiveDateTime) -> NaiveDateTime {
    t.with_nanosecond(0).unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_offsets() {
        let clock = FixedClock::at_date(2024, 3, 1).unwrap();
        assert_eq!(clock.offset_days(-1).date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(clock.offset_days(0), clock.now());
    }

    #[test]
    fn system_clock_has_no_subseconds() {
        assert_eq!(SystemClock.now().nanosecond(), 0);
    }
}
