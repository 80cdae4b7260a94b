//! Time utilities: an injectable clock and timezone-aware month windows.

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Source of "now" for anything that buckets records by age.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Length of the trailing window used for trends and daily spend.
pub const TRAILING_WINDOW_DAYS: i64 = 30;

/// Start of the trailing window ending at `now`.
pub fn trailing_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(TRAILING_WINDOW_DAYS)
}

/// Parse an IANA timezone name like "America/Chicago".
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {name}"))
}

/// UTC bounds `[start, end)` of a calendar month as observed in `tz`.
pub fn month_bounds_utc(year: i32, month: u32, tz: Tz) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow::anyhow!("invalid month: {year}-{month:02}"))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| anyhow::anyhow!("invalid month: {year}-{month:02}"))?;

    let start = local_midnight_utc(first, tz)?;
    let end = local_midnight_utc(next, tz)?;
    Ok((start, end))
}

/// Calendar (year, month) of `now` in `tz`.
pub fn local_year_month(now: DateTime<Utc>, tz: Tz) -> (i32, u32) {
    let local = now.with_timezone(&tz);
    (local.year(), local.month())
}

/// Start of `day` in `tz`, as a UTC instant.
pub fn local_midnight_utc(day: NaiveDate, tz: Tz) -> Result<DateTime<Utc>> {
    let ndt = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("invalid midnight for {day}"))?;
    // Midnight can be skipped by a DST jump; take the earliest valid instant.
    let local = tz
        .from_local_datetime(&ndt)
        .earliest()
        .ok_or_else(|| anyhow::anyhow!("nonexistent local midnight: {day} {tz}"))?;
    Ok(local.with_timezone(&Utc))
}
