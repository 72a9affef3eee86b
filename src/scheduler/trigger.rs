use std::fmt;
use std::time::Duration;

use chrono::{Days, NaiveDateTime, NaiveTime};

/// When the reminder scheduler wakes up. One trigger drives every task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Every fixed period, starting immediately.
    Interval(Duration),
    /// Once a day at a local wall-clock time.
    Daily(NaiveTime),
}

impl Trigger {
    /// How long to sleep from `now` (local time) until the next wake-up.
    pub fn delay_from(&self, now: NaiveDateTime) -> Duration {
        match *self {
            Self::Interval(period) => period,
            Self::Daily(at) => {
                let today = now.date().and_time(at);
                let next = if today > now {
                    today
                } else {
                    now.date()
                        .checked_add_days(Days::new(1))
                        .map(|d| d.and_time(at))
                        .unwrap_or(today)
                };
                (next - now).to_std().unwrap_or(Duration::ZERO)
            }
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interval(period) => {
                let secs = period.as_secs();
                if secs >= 3600 && secs % 3600 == 0 {
                    write!(f, "every {} hours", secs / 3600)
                } else if secs >= 60 && secs % 60 == 0 {
                    write!(f, "every {} minutes", secs / 60)
                } else {
                    write!(f, "every {secs} seconds")
                }
            }
            Self::Daily(at) => write!(f, "daily at {}", at.format("%H:%M")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn now(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap().and_time(at(h, m))
    }

    #[test]
    fn daily_trigger_waits_until_later_today() {
        let trigger = Trigger::Daily(at(8, 0));
        assert_eq!(trigger.delay_from(now(7, 30)), Duration::from_secs(30 * 60));
    }

    #[test]
    fn daily_trigger_rolls_over_midnight() {
        let trigger = Trigger::Daily(at(8, 0));
        assert_eq!(trigger.delay_from(now(8, 0)), Duration::from_secs(24 * 3600));
        assert_eq!(trigger.delay_from(now(23, 0)), Duration::from_secs(9 * 3600));
    }

    #[test]
    fn interval_trigger_is_constant() {
        let trigger = Trigger::Interval(Duration::from_secs(12 * 3600));
        assert_eq!(trigger.delay_from(now(3, 0)), Duration::from_secs(12 * 3600));
        assert_eq!(trigger.to_string(), "every 12 hours");
        assert_eq!(Trigger::Daily(at(8, 0)).to_string(), "daily at 08:00");
    }
}
