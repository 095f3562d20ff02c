//! Solar Hijri (Jalali) dates for the snapshot timestamp.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use icu_calendar::persian::Persian;
use icu_calendar::Date;

use crate::constants::SNAPSHOT_TIMEZONE;
use crate::error::{Result, ScraperError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JalaliDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Convert a proleptic Gregorian date to the Solar Hijri calendar.
pub fn gregorian_to_jalali(gy: i32, gm: u32, gd: u32) -> Result<JalaliDate> {
    let month = u8::try_from(gm)
        .map_err(|_| ScraperError::Calendar(format!("month {gm} out of range")))?;
    let day =
        u8::try_from(gd).map_err(|_| ScraperError::Calendar(format!("day {gd} out of range")))?;

    let iso = Date::try_new_iso_date(gy, month, day)
        .map_err(|e| ScraperError::Calendar(format!("{gy}-{gm:02}-{gd:02}: {e}")))?;
    let persian = iso.to_calendar(Persian);

    Ok(JalaliDate {
        year: persian.year().number,
        month: persian.month().ordinal,
        day: persian.day_of_month().0,
    })
}

/// `YYYY/MM/DD, HH:MM` with the date in the Jalali calendar and the clock of `at`'s zone.
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> Result<String> {
    let date = gregorian_to_jalali(at.year(), at.month(), at.day())?;
    Ok(format!(
        "{:04}/{:02}/{:02}, {:02}:{:02}",
        date.year,
        date.month,
        date.day,
        at.hour(),
        at.minute()
    ))
}

/// Current time in the snapshot timezone.
pub fn now() -> DateTime<chrono_tz::Tz> {
    Utc::now().with_timezone(&SNAPSHOT_TIMEZONE)
}

pub fn timestamp_now() -> Result<String> {
    format_timestamp(&now())
}
