//! Conversions between UTC time tags and POSIX seconds.
//!
//! All conversions are done on timezone-aware UTC values.
//! The local timezone of the host never enters the
//! computation.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{AuxError, Result};

/// Layout of AUX time tags, e.g. `2019-05-12T16:10:40.5`.
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

lazy_static! {
    static ref ISO_UTC: Regex =
        Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{1,6})Z?$").unwrap();
}

/// Convert a UTC time tag in ISO 8601 form
/// (`YYYY-MM-DDTHH:MM:SS.ffffff`, optionally suffixed with
/// `Z`) to POSIX seconds.
///
/// Surrounding whitespace is ignored. A missing fraction,
/// more than six fractional digits or any zone designator
/// other than `Z` is rejected.
pub fn iso2epoch(date_str: &str) -> Result<f64> {
    let format_error = || AuxError::TimeFormat {
        input: date_str.to_owned(),
    };

    let body = ISO_UTC
        .captures(date_str.trim())
        .and_then(|c| c.get(1))
        .ok_or_else(format_error)?
        .as_str();

    let naive = NaiveDateTime::parse_from_str(body, ISO_FORMAT).map_err(|_| format_error())?;
    Ok(epoch_seconds(&naive.and_utc()))
}

/// Inverse of [`iso2epoch`]: render POSIX seconds as a UTC
/// time tag with microsecond resolution.
pub fn epoch2iso(epoch: f64) -> Result<String> {
    Ok(datetime_from_epoch(epoch)?
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string())
}

/// POSIX seconds to a UTC datetime, rounded to the nearest
/// microsecond.
pub fn datetime_from_epoch(epoch: f64) -> Result<DateTime<Utc>> {
    let range_error = || AuxError::TimeFormat {
        input: epoch.to_string(),
    };
    if !epoch.is_finite() {
        return Err(range_error());
    }

    let micros = (epoch * 1e6).round() as i64;
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos).ok_or_else(range_error)
}

pub fn epoch_seconds(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9
}

/// Build a UTC datetime from year, day of year and GPS
/// seconds of day, as found in trajectory and pyrometer
/// products.
///
/// `utc_offset` is the GPS-UTC offset in seconds and is
/// truncated to whole seconds. Fractions of a second are
/// rounded to 0.1 s, which caps the supported rate at 10
/// Hz. Seconds of day past 86400 roll into the next day.
pub fn datetime_from_doy(year: i32, doy: u32, sod: f64, utc_offset: f64) -> Result<DateTime<Utc>> {
    let range_error = || AuxError::TimeFormat {
        input: format!("{} day {} second {}", year, doy, sod),
    };
    if !(1..=366).contains(&doy) || !sod.is_finite() || !utc_offset.is_finite() {
        return Err(range_error());
    }

    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(range_error)?;

    let whole = sod.floor();
    let tenths = ((sod - whole) * 10.).round() as i64;
    // saturating cast; out-of-range seconds fail in try_seconds
    let seconds = (whole - utc_offset.trunc()) as i64;
    let naive = Duration::try_days(i64::from(doy) - 1)
        .and_then(|d| jan1.checked_add_signed(d))
        .zip(Duration::try_seconds(seconds))
        .and_then(|(t, d)| t.checked_add_signed(d))
        .and_then(|t| t.checked_add_signed(Duration::microseconds(tenths * 100_000)))
        .ok_or_else(range_error)?;

    Ok(naive.and_utc())
}

/// Compact form used when reporting search windows, e.g.
/// `2019-05-04T20:00:05.123456` becomes
/// `2019/05/04 20:00:05.12`.
pub fn display_timestamp(tag: &str) -> String {
    let out = tag.replace('T', " ").replace('-', "/");
    let keep = out.chars().count().saturating_sub(4);
    out.chars().take(keep).collect()
}
