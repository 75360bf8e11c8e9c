//! Julian Date utilities.
//!
//! The engine measures time in seconds since the J2000 epoch
//! (Julian Date 2451545.0, 2000-01-01 12:00 TT), while the ephemeris
//! works in Julian centuries since that same epoch.
//! This module converts between those and calendar dates, Unix timestamps
//! and [`chrono`] date-times.
//!
//! Calendar conversions follow the proleptic Julian calendar before
//! 1582-10-15 and the Gregorian calendar from then on, like most
//! astronomical software does.
//!
//! # Example
//! ```
//! use patched_conic_sim::time::calendar_to_julian_date;
//!
//! let jd = calendar_to_julian_date(2000, 1, 1.5).unwrap();
//! assert_eq!(jd, 2451545.0);
//! ```

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    error::{EngineError, Result},
    J2000_JULIAN_DATE, SECONDS_PER_CENTURY, SECONDS_PER_DAY,
};

/// The Julian Date of the Unix epoch, 1970-01-01 00:00 UTC.
pub const UNIX_EPOCH_JULIAN_DATE: f64 = 2_440_587.5;

/// The first Julian Day Number on the Gregorian calendar (1582-10-15).
const GREGORIAN_START_DAY_NUMBER: f64 = 2_299_161.0;

const MILLIS_PER_DAY: f64 = SECONDS_PER_DAY * 1000.0;

/// Converts a calendar date into a Julian Date.
///
/// `day` may carry a fraction of a day, so noon on the first of a month
/// is `1.5`.
///
/// # Errors
/// Returns [`EngineError::InvalidDate`] when the month is not within
/// 1..=12, the day is past the end of the month (leap years counted by
/// the calendar in force), or the date falls into the ten days dropped
/// by the Gregorian reform (1582-10-05 to 1582-10-14).
pub fn calendar_to_julian_date(year: i32, month: u32, day: f64) -> Result<f64> {
    let invalid = EngineError::InvalidDate { year, month, day };

    if !(1..=12).contains(&month) || !(1.0..32.0).contains(&day) {
        return Err(invalid);
    }

    let whole_day = day.floor() as u32;
    let is_gregorian = (year, month, whole_day) >= (1582, 10, 15);
    if !is_gregorian && (year, month, whole_day) > (1582, 10, 4) {
        return Err(invalid);
    }

    let exists = if is_gregorian {
        NaiveDate::from_ymd_opt(year, month, whole_day).is_some()
    } else {
        whole_day <= julian_month_length(year, month)
    };
    if !exists {
        return Err(invalid);
    }

    let (y, m) = if month <= 2 {
        (year as f64 - 1.0, month as f64 + 12.0)
    } else {
        (year as f64, month as f64)
    };

    let b = if is_gregorian {
        let a = (y / 100.0).floor();
        2.0 - a + (a / 4.0).floor()
    } else {
        0.0
    };

    Ok((365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + day + b - 1524.5)
}

/// Days in a month of the Julian calendar, where every fourth year is a
/// leap year.
fn julian_month_length(year: i32, month: u32) -> u32 {
    match month {
        2 if year.rem_euclid(4) == 0 => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Converts a Julian Date into a calendar date.
///
/// Returns `(year, month, day)` where the day carries the fraction of the
/// day. Inverse of [`calendar_to_julian_date`].
pub fn julian_date_to_calendar(julian_date: f64) -> (i32, u32, f64) {
    let shifted = julian_date + 0.5;
    let z = shifted.floor();
    let fraction = shifted - z;

    let a = if z >= GREGORIAN_START_DAY_NUMBER {
        let alpha = ((z - 1_867_216.25) / 36_524.25).floor();
        z + 1.0 + alpha - (alpha / 4.0).floor()
    } else {
        z
    };

    let b = a + 1524.0;
    let c = ((b - 122.1) / 365.25).floor();
    let d = (365.25 * c).floor();
    let e = ((b - d) / 30.6001).floor();

    let day = b - d - (30.6001 * e).floor() + fraction;
    let month = if e < 14.0 { e - 1.0 } else { e - 13.0 };
    let year = if month > 2.0 { c - 4716.0 } else { c - 4715.0 };

    (year as i32, month as u32, day)
}

/// Converts milliseconds since the Unix epoch into a Julian Date.
#[inline]
pub fn unix_millis_to_julian_date(millis: f64) -> f64 {
    millis / MILLIS_PER_DAY + UNIX_EPOCH_JULIAN_DATE
}

/// Converts a Julian Date into milliseconds since the Unix epoch.
#[inline]
pub fn julian_date_to_unix_millis(julian_date: f64) -> f64 {
    (julian_date - UNIX_EPOCH_JULIAN_DATE) * MILLIS_PER_DAY
}

/// Converts a Julian Date into seconds since J2000, the engine's time scale.
#[inline]
pub fn julian_date_to_seconds(julian_date: f64) -> f64 {
    (julian_date - J2000_JULIAN_DATE) * SECONDS_PER_DAY
}

/// Converts seconds since J2000 into a Julian Date.
#[inline]
pub fn seconds_to_julian_date(seconds: f64) -> f64 {
    seconds / SECONDS_PER_DAY + J2000_JULIAN_DATE
}

/// Converts seconds since J2000 into Julian centuries since J2000,
/// the ephemeris' time scale.
#[inline]
pub fn seconds_to_centuries(seconds: f64) -> f64 {
    seconds / SECONDS_PER_CENTURY
}

/// Converts Julian centuries since J2000 into seconds since J2000.
#[inline]
pub fn centuries_to_seconds(centuries: f64) -> f64 {
    centuries * SECONDS_PER_CENTURY
}

/// Converts a date-time into a Julian Date.
pub fn datetime_to_julian_date(date_time: &DateTime<Utc>) -> f64 {
    unix_millis_to_julian_date(date_time.timestamp_millis() as f64)
}

/// Converts a date-time into seconds since J2000.
pub fn datetime_to_seconds(date_time: &DateTime<Utc>) -> f64 {
    julian_date_to_seconds(datetime_to_julian_date(date_time))
}

/// Converts a Julian Date into a date-time, rounded to the millisecond.
///
/// Returns `None` when the date is outside of what [`DateTime`] can
/// represent.
pub fn julian_date_to_datetime(julian_date: f64) -> Option<DateTime<Utc>> {
    let millis = julian_date_to_unix_millis(julian_date).round();

    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }

    DateTime::from_timestamp_millis(millis as i64)
}
