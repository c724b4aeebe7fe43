//! Date/time utilities for gator.
//!
//! Publish dates in feeds come in a handful of formats. [`normalize_pub_date`]
//! tries them in a fixed order and gives up quietly: an unreadable date is
//! reported as unknown, never as an error.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// A publish-date layout, tried in declaration order.
#[derive(Debug, Clone, Copy)]
enum Layout {
    /// `Mon, 02 Jan 2006 15:04:05 -0700`
    Rfc1123Z,
    /// `Mon, 02 Jan 2006 15:04:05 MST`
    Rfc1123,
    /// `02 Jan 06 15:04 -0700`
    Rfc822Z,
    /// `02 Jan 06 15:04 MST`
    Rfc822,
    /// `2006-01-02T15:04:05Z07:00`
    Rfc3339,
}

const LAYOUTS: [Layout; 5] = [
    Layout::Rfc1123Z,
    Layout::Rfc1123,
    Layout::Rfc822Z,
    Layout::Rfc822,
    Layout::Rfc3339,
];

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Parse a feed publish date into an instant.
///
/// Returns `None` when no known layout matches.
pub fn normalize_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    LAYOUTS.iter().find_map(|layout| parse_with(*layout, s))
}

fn parse_with(layout: Layout, s: &str) -> Option<DateTime<Utc>> {
    match layout {
        Layout::Rfc1123Z => parse_numeric_zone(strip_weekday(s)?, "%d %b %Y %H:%M:%S %z"),
        Layout::Rfc1123 => parse_named_zone(strip_weekday(s)?, "%d %b %Y %H:%M:%S"),
        Layout::Rfc822Z => parse_numeric_zone(s, "%d %b %y %H:%M %z"),
        Layout::Rfc822 => parse_named_zone(s, "%d %b %y %H:%M"),
        Layout::Rfc3339 => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// Remove a leading `Mon, ` prefix.
///
/// The weekday name is checked for syntax only; it is not required to agree
/// with the date.
fn strip_weekday(s: &str) -> Option<&str> {
    let (day, rest) = s.split_once(", ")?;
    WEEKDAYS.contains(&day).then_some(rest)
}

fn parse_numeric_zone(s: &str, format: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s, format)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_named_zone(s: &str, format: &str) -> Option<DateTime<Utc>> {
    let (stamp, zone) = s.rsplit_once(' ')?;
    if zone.is_empty() || zone.len() > 5 || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let naive = NaiveDateTime::parse_from_str(stamp, format).ok()?;
    let offset = FixedOffset::east_opt(zone_offset_secs(zone))?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Offset for the zone names RFC 822 defines. Any other name is read as UTC.
fn zone_offset_secs(zone: &str) -> i32 {
    let hours = match zone.to_ascii_uppercase().as_str() {
        "EST" => -5,
        "EDT" => -4,
        "CST" => -6,
        "CDT" => -5,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        _ => 0,
    };
    hours * 3600
}

/// Format an instant for storage.
///
/// Fixed-width UTC so that lexical order in the database is time order.
pub fn to_db_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp back into an instant.
pub fn parse_db_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // SQLite datetime('now') format
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a DateTime<Utc> in the specified timezone.
///
/// Falls back to UTC if the timezone name is unknown.
pub fn format_utc_datetime(dt: &DateTime<Utc>, timezone: &str, format: &str) -> String {
    let tz: Tz = match timezone.parse() {
        Ok(tz) => tz,
        Err(_) => return dt.format(format).to_string(),
    };
    dt.with_timezone(&tz).format(format).to_string()
}
