//! Minute-of-day arithmetic and the clock the scheduler reads

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Timelike};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Minutes in a day; valid minute-of-day values are `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Source of the current minute of day
pub trait Clock: Send {
    fn minute_of_day(&self) -> i32;
}

/// Wall clock in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn minute_of_day(&self) -> i32 {
        minute_of_day(&Local::now())
    }
}

/// Clock pinned to a minute that only changes when told to
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    minute: Arc<AtomicI32>,
}

impl FixedClock {
    pub fn new(minute: i32) -> Self {
        Self {
            minute: Arc::new(AtomicI32::new(minute)),
        }
    }

    /// Move the clock; clones observe the change
    pub fn set(&self, minute: i32) {
        self.minute.store(minute, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn minute_of_day(&self) -> i32 {
        self.minute.load(Ordering::SeqCst)
    }
}

/// hour * 60 + minute
pub fn minute_of_day<T: Timelike>(time: &T) -> i32 {
    (time.hour() * 60 + time.minute()) as i32
}

/// Time left until the next whole minute starts.
///
/// Exactly on a boundary this is a full minute, never zero.
pub fn until_next_minute(now: DateTime<Local>) -> Duration {
    let into_minute =
        Duration::from_secs(now.second() as u64) + Duration::from_nanos(now.nanosecond() as u64);
    Duration::from_secs(60).saturating_sub(into_minute).max(Duration::from_millis(1))
}

/// Parse `HH:MM` into a minute of day
pub fn parse_minute(s: &str) -> Result<i32> {
    let (hours, minutes) = s
        .trim()
        .split_once(':')
        .with_context(|| format!("Expected HH:MM, got '{}'", s))?;

    let hours: i32 = hours
        .parse()
        .with_context(|| format!("Invalid hour in '{}'", s))?;
    let minutes: i32 = minutes
        .parse()
        .with_context(|| format!("Invalid minute in '{}'", s))?;

    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        anyhow::bail!("Time out of range: {}", s);
    }

    Ok(hours * 60 + minutes)
}

/// Format a minute of day as `HH:MM`
pub fn format_minute(minute: i32) -> String {
    let minute = minute.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};

    #[test]
    fn minute_of_day_counts_from_midnight() {
        let t = NaiveTime::from_hms_opt(8, 0, 59).unwrap();
        assert_eq!(minute_of_day(&t), 480);
        let t = NaiveTime::from_hms_opt(23, 59, 0).unwrap();
        assert_eq!(minute_of_day(&t), 1439);
    }

    #[test]
    fn next_minute_is_aligned_to_boundary() {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 10, 15, 42).unwrap();
        assert_eq!(until_next_minute(now), Duration::from_secs(18));

        let on_boundary = Local.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap();
        assert_eq!(until_next_minute(on_boundary), Duration::from_secs(60));
    }

    #[test]
    fn parse_and_format() {
        assert_eq!(parse_minute("01:40").unwrap(), 100);
        assert_eq!(parse_minute("23:59").unwrap(), 1439);
        assert!(parse_minute("24:00").is_err());
        assert!(parse_minute("noon").is_err());
        assert_eq!(format_minute(100), "01:40");
        assert_eq!(format_minute(-1), "23:59");
    }
}
