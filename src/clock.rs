use chrono::{DateTime, NaiveDate, Utc};

const DAY_KEY_FMT: &str = "%Y-%m-%d";

/// Calendar-day bucket used to key daily statistics, e.g. `2026-10-17`.
pub fn date_key(day: NaiveDate) -> String {
    day.format(DAY_KEY_FMT).to_string()
}

/// Source of "now" for the host. Ticks use the wall-clock instant, statistics
/// use the local calendar day.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use super::Clock;
    use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
    use std::{cell::Cell, time::Duration};

    /// Clock that only moves when told to.
    pub struct ManualClock {
        now: Cell<DateTime<Utc>>,
        today: Cell<NaiveDate>,
    }

    impl ManualClock {
        pub fn new(today: NaiveDate) -> Self {
            Self {
                now: Cell::new(Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap()),
                today: Cell::new(today),
            }
        }

        pub fn advance(&self, by: Duration) {
            self.now.set(self.now.get() + TimeDelta::from_std(by).unwrap());
        }

        pub fn set_today(&self, today: NaiveDate) {
            self.today.set(today);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            self.now.get()
        }

        fn today(&self) -> NaiveDate {
            self.today.get()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use std::time::Duration;

    #[test]
    fn date_key_is_zero_padded() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(date_key(day), "2026-03-07");
    }

    #[test]
    fn manual_clock_advances_only_on_request() {
        let clock = ManualClock::new(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
        let start = clock.now();
        assert_eq!(clock.now(), start);

        clock.advance(Duration::from_millis(200));
        assert_eq!(clock.now() - start, TimeDelta::milliseconds(200));

        clock.set_today(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!(date_key(clock.today()), "2026-10-18");
    }
}
