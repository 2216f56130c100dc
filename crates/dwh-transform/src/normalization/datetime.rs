//! Locale-agnostic date/time parsing.
//!
//! Source documents carry dates as ISO 8601 strings (with or without an
//! offset), as loosely formatted text, or as epoch milliseconds. Every
//! parser here returns `None` instead of failing; callers turn that into a
//! null cell.
//!
//! Offsets are normalized to UTC, so all parsed values are naive UTC
//! timestamps and can be subtracted from each other directly.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use dwh_model::CellValue;

/// Parses a date/time string.
///
/// Slash dates are read month-first, falling back to day-first when the
/// first component cannot be a month.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    try_parse_with_offset(trimmed)
        .or_else(|| try_parse_datetime(trimmed))
        .or_else(|| try_parse_date(trimmed).map(|d| d.and_time(NaiveTime::MIN)))
}

/// Parses a cell into a date cell; anything unparsable becomes null.
///
/// Numbers are read as epoch milliseconds.
pub fn parse_cell(value: &CellValue) -> CellValue {
    let parsed = match value {
        CellValue::Date(dt) => Some(*dt),
        CellValue::Text(text) => parse_datetime(text),
        CellValue::Number(millis) if millis.is_finite() => {
            DateTime::from_timestamp_millis(*millis as i64).map(|dt| dt.naive_utc())
        }
        _ => None,
    };
    parsed.map_or(CellValue::Null, CellValue::Date)
}

/// Try offset-qualified formats, converting to UTC.
fn try_parse_with_offset(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M%z",
    ];

    for fmt in &formats {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.naive_utc());
        }
    }

    // Trailing 'Z' without seconds or with a space separator
    let without_zulu = value.strip_suffix('Z')?;
    try_parse_datetime(without_zulu)
}

/// Try to parse full datetime formats.
fn try_parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%d-%b-%Y %H:%M:%S", // 15-Jan-2024 10:30:00
    ];

    for fmt in &formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }

    None
}

/// Try to parse date-only formats.
fn try_parse_date(value: &str) -> Option<NaiveDate> {
    let formats = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%m/%d/%Y",  // 01/15/2024
        "%d/%m/%Y",  // 15/01/2024
        "%d.%m.%Y",  // 15.01.2024
        "%d-%b-%Y",  // 15-Jan-2024
        "%b %d, %Y", // Jan 15, 2024
        "%B %d, %Y", // January 15, 2024
        "%d %b %Y",  // 15 Jan 2024
        "%d %B %Y",  // 15 January 2024
        "%Y%m%d",    // 20240115
    ];

    for fmt in &formats {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return Some(d);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_iso_date() {
        let dt = parse_datetime("2023-01-15").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 1, 15));
    }

    #[test]
    fn test_extended_json_timestamp() {
        assert_eq!(
            parse_datetime("2023-01-15T00:00:00.000Z"),
            Some(date(2023, 1, 15))
        );
    }

    #[test]
    fn test_offset_converted_to_utc() {
        let dt = parse_datetime("2023-01-15T01:30:00+02:00").unwrap();
        assert_eq!((dt.day(), dt.hour(), dt.minute()), (14, 23, 30));
    }

    #[test]
    fn test_slash_dates_month_first() {
        assert_eq!(parse_datetime("01/02/2023"), Some(date(2023, 1, 2)));
        assert_eq!(parse_datetime("15/01/2023"), Some(date(2023, 1, 15)));
    }

    #[test]
    fn test_text_month() {
        assert_eq!(parse_datetime("Jan 15, 2023"), Some(date(2023, 1, 15)));
        assert_eq!(parse_datetime("15 January 2023"), Some(date(2023, 1, 15)));
    }

    #[test]
    fn test_unparsable_is_none() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("   "), None);
        assert_eq!(parse_datetime("not a date"), None);
        assert_eq!(parse_datetime("2023-13-45"), None);
    }

    #[test]
    fn test_parse_cell_variants() {
        assert_eq!(parse_cell(&CellValue::Null), CellValue::Null);
        assert_eq!(parse_cell(&CellValue::Bool(true)), CellValue::Null);
        assert_eq!(
            parse_cell(&CellValue::from("2023-01-15")),
            CellValue::Date(date(2023, 1, 15))
        );
        assert_eq!(
            parse_cell(&CellValue::Number(1_673_740_800_000.0)),
            CellValue::Date(date(2023, 1, 15))
        );
    }
}
