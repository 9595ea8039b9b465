//! # Clock Module
//!
//! Injectable time source.
//!
//! Two rules in this system depend on "now": a manual transaction entry
//! may not be dated in the future, and settling a comanda stamps its
//! `closed_at`. Reading the wall clock inline would make both untestable,
//! so every caller goes through the [`Clock`] trait and production code
//! hands in [`SystemClock`].

use chrono::{DateTime, NaiveDate, Utc};

/// Supplies the current instant.
///
/// ## Usage
/// ```rust
/// use studio_core::clock::{Clock, FixedClock};
/// use chrono::NaiveDate;
///
/// let clock = FixedClock::on(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
/// assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
/// ```
pub trait Clock: Send + Sync {
    /// The current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// The current calendar date, derived from [`Clock::now`].
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock reading the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    /// Pins the clock to the given instant.
    pub fn at(instant: DateTime<Utc>) -> Self {
        FixedClock { instant }
    }

    /// Pins the clock to midnight UTC on the given date.
    pub fn on(date: NaiveDate) -> Self {
        FixedClock {
            instant: date
                .and_hms_opt(0, 0, 0)
                .expect("midnight is always a valid time")
                .and_utc(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_is_deterministic() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let clock = FixedClock::on(date);

        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.today(), date);
    }

    #[test]
    fn test_system_clock_today_matches_now() {
        let clock = SystemClock;
        assert_eq!(clock.today(), clock.now().date_naive());
    }
}
