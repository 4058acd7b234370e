//! Birth date helpers.
//!
//! Everything that depends on "now" takes it as a parameter so the pipeline
//! stays a pure function of its inputs. Calendar arithmetic happens in the
//! local time zone, matching what a user sees on a form.

use chrono::{
    DateTime, Datelike, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc,
};

const MS_PER_YEAR: f64 = 1000.0 * 60.0 * 60.0 * 24.0 * 365.25;

/// Convert a `YYYY-MM-DD` form value to the instant of local midnight,
/// rendered as `2001-05-10T00:00:00.000Z`.
pub fn to_iso_date_time(input: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()?;
    let midnight = local_midnight(date)?;
    Some(
        midnight
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

/// Parse a stored birth date.
///
/// RFC 3339 instants are taken as-is, naive date-times as local time and bare
/// dates as UTC midnight.
pub fn parse_birth_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Local calendar date of a stored birth date.
pub fn birth_date_local(value: &str) -> Option<NaiveDate> {
    parse_birth_date(value).map(|instant| instant.with_timezone(&Local).date_naive())
}

/// Format a stored birth date for a date input. Unparseable values pass through.
pub fn to_input_date(value: &str) -> String {
    match birth_date_local(value) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => value.to_string(),
    }
}

/// Age in whole years: elapsed time over 365.25-day years, floored at 0.
pub fn age_in_years(birth: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let elapsed = (now - birth).num_milliseconds() as f64;
    (elapsed / MS_PER_YEAR).floor().max(0.0) as u32
}

/// Days from `today` to the next occurrence of `birth`'s month and day.
///
/// A birthday that already passed this year counts toward next year's. Feb 29
/// falls on Mar 1 in non-leap years, and on Feb 29 itself when next year is a
/// leap year.
pub fn days_until_next_birthday(birth: NaiveDate, today: NaiveDate) -> i64 {
    let mut next = anniversary(birth, today.year());
    if next < today {
        next = anniversary(birth, today.year() + 1);
    }
    (next - today).num_days()
}

/// "Today", "Tomorrow" or "N days".
pub fn relative_days_label(days: i64) -> String {
    match days {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        n => format!("{n} days"),
    }
}

fn anniversary(birth: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, birth.month(), birth.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(birth)
}

fn local_midnight(date: NaiveDate) -> Option<DateTime<Local>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    Local.from_local_datetime(&naive).earliest()
}
