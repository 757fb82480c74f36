use chrono::{DateTime, TimeZone, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_MONTH: f64 = 365.25 / 12.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// Converts a listing's `created_utc` into a timestamp.
pub fn from_epoch(created_utc: f64) -> Option<DateTime<Utc>> {
    if !created_utc.is_finite() {
        return None;
    }
    Utc.timestamp_opt(created_utc.trunc() as i64, 0).single()
}

/// Describes `then` relative to `now`, e.g. "3 hours ago" or "in a day".
///
/// Each unit is rounded to the nearest whole value and the first bucket
/// that fits wins: up to 44 seconds is "a few seconds", 45 to 89 seconds
/// "a minute", up to 44 minutes counts minutes, up to 89 minutes is "an
/// hour", up to 21 hours counts hours, up to 35 hours is "a day", up to
/// 25 days counts days, up to 45 days is "a month", up to 10 months counts
/// months, up to 17 months is "a year", and past that years are counted.
pub fn from_now(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = (now - then).num_seconds();
    let seconds = delta.unsigned_abs() as f64;

    let minutes = (seconds / 60.0).round();
    let hours = (seconds / 3_600.0).round();
    let days = (seconds / SECONDS_PER_DAY).round();
    let months = (seconds / SECONDS_PER_DAY / DAYS_PER_MONTH).round();
    let years = (seconds / SECONDS_PER_DAY / DAYS_PER_YEAR).round();

    let phrase = if seconds.round() <= 44.0 {
        "a few seconds".to_string()
    } else if seconds.round() <= 89.0 {
        "a minute".to_string()
    } else if minutes <= 44.0 {
        format!("{} minutes", minutes)
    } else if minutes <= 89.0 {
        "an hour".to_string()
    } else if hours <= 21.0 {
        format!("{} hours", hours)
    } else if hours <= 35.0 {
        "a day".to_string()
    } else if days <= 25.0 {
        format!("{} days", days)
    } else if days <= 45.0 {
        "a month".to_string()
    } else if months <= 10.0 {
        format!("{} months", months)
    } else if months <= 17.0 {
        "a year".to_string()
    } else {
        format!("{} years", years.max(2.0))
    };

    if delta < 0 {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}
