//! Date normalization in the store's time zone.
//!
//! Every comparison between sheet dates happens on the canonical
//! `yyyy-mm-dd` form produced here, so a cell holding `2024-05-01`,
//! `05/01/2024` or an RFC 3339 timestamp all compare equal when they land
//! on the same calendar day in the store zone.

use crate::types::Cell;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Canonical date format used for comparisons.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp format used in log lines.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATE_INPUTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_INPUTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a date-like cell into a calendar date in `tz`.
///
/// Numbers are epoch milliseconds. Naive date-times are wall-clock times in
/// `tz`; RFC 3339 timestamps are converted into `tz` first.
pub fn parse_date(cell: &Cell, tz: Tz) -> Option<NaiveDate> {
    match cell {
        Cell::Text(s) => parse_date_str(s.trim(), tz),
        Cell::Number(ms) if ms.is_finite() => DateTime::<Utc>::from_timestamp_millis(*ms as i64)
            .map(|utc| utc.with_timezone(&tz).date_naive()),
        _ => None,
    }
}

fn parse_date_str(s: &str, tz: Tz) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&tz).date_naive());
    }
    if let Some(date) = DATE_INPUTS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(date);
    }
    DATETIME_INPUTS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// Normalize a cell to `yyyy-mm-dd`, or an empty string when it holds no date.
pub fn format_date(cell: &Cell, tz: Tz) -> String {
    parse_date(cell, tz)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Format an instant as `yyyy-mm-dd` in `tz`.
pub fn format_day<Z: TimeZone>(instant: &DateTime<Z>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(DATE_FORMAT).to_string()
}

/// Format an instant as `yyyy-mm-dd HH:MM:SS` in `tz`.
pub fn format_timestamp<Z: TimeZone>(instant: &DateTime<Z>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(TIMESTAMP_FORMAT).to_string()
}

/// Parse an IANA zone name such as `Asia/Kolkata`.
pub fn parse_time_zone(name: &str) -> Result<Tz, crate::error::Error> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| crate::error::Error::InvalidTimeZone {
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::{America::New_York, Asia::Kolkata, UTC};

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn plain_dates_in_several_layouts() {
        assert_eq!(format_date(&text("2024-05-01"), UTC), "2024-05-01");
        assert_eq!(format_date(&text("2024/05/01"), UTC), "2024-05-01");
        assert_eq!(format_date(&text("05/01/2024"), UTC), "2024-05-01");
        assert_eq!(format_date(&text(" 2024-05-01 10:30:00 "), UTC), "2024-05-01");
    }

    #[test]
    fn plain_dates_do_not_shift_with_zone() {
        assert_eq!(format_date(&text("2024-05-01"), New_York), "2024-05-01");
        assert_eq!(format_date(&text("2024-05-01"), Kolkata), "2024-05-01");
    }

    #[test]
    fn timestamps_convert_into_store_zone() {
        let cell = text("2024-05-01T22:00:00Z");
        assert_eq!(format_date(&cell, UTC), "2024-05-01");
        assert_eq!(format_date(&cell, Kolkata), "2024-05-02");
    }

    #[test]
    fn numbers_are_epoch_millis() {
        // 2024-05-01T00:00:00Z
        let cell = Cell::Number(1_714_521_600_000.0);
        assert_eq!(format_date(&cell, UTC), "2024-05-01");
        assert_eq!(format_date(&cell, New_York), "2024-04-30");
    }

    #[test]
    fn non_dates_format_empty() {
        assert_eq!(format_date(&Cell::Empty, UTC), "");
        assert_eq!(format_date(&text("   "), UTC), "");
        assert_eq!(format_date(&text("tomorrow"), UTC), "");
        assert_eq!(format_date(&Cell::Bool(true), UTC), "");
    }

    #[test]
    fn day_and_timestamp_use_zone() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 20, 15, 0).unwrap();
        assert_eq!(format_day(&instant, Kolkata), "2024-05-02");
        assert_eq!(format_timestamp(&instant, UTC), "2024-05-01 20:15:00");
    }

    #[test]
    fn zone_names() {
        assert!(parse_time_zone("Asia/Kolkata").is_ok());
        assert!(parse_time_zone("Mars/Olympus").is_err());
    }
}
