//! Whole-day spans between timestamps.

use chrono::{NaiveDateTime, TimeDelta};

/// Number of whole days from `start` to `end`, floored.
///
/// Partial days round toward negative infinity, so an end twelve hours
/// before the start is day -1 rather than day 0.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use dwh_transform::normalization::duration::whole_days_between;
///
/// let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let end = NaiveDate::from_ymd_opt(2023, 1, 11).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// assert_eq!(whole_days_between(start, end), 10);
/// ```
pub fn whole_days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    let span = end - start;
    let days = span.num_days();
    if span < TimeDelta::days(days) {
        days - 1
    } else {
        days
    }
}
