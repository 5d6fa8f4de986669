//! Time-partition path derivation for attendance storage.
//!
//! Attendance rows are keyed by `(year, month, week, day, member_id)` where the
//! first four components are derived from the writer's local wall clock. The
//! string formats here are a compatibility contract with data written by
//! earlier deployments and must not change: four-digit year, zero-padded
//! two-digit month and day, and the `minggu-N` week token.

use chrono::{DateTime, Datelike, Local, NaiveDate, Timelike};

/// Display/storage timestamp format: `YYYY-MM-DD HH:mm:ss`, local time,
/// no timezone suffix. Reporting code splits this on the single space to
/// separate the date part from the time part, so the format is load-bearing.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returns the `minggu-N` week token for a day of the month.
///
/// Weeks are fixed 7-day buckets anchored at day 1: days 1–7 are `minggu-1`,
/// 8–14 are `minggu-2`, and so on up to `minggu-5` for days 29–31. This is
/// deliberately not calendar-week aligned and ignores month boundaries; the
/// bucketing matches what historic data was written with.
pub fn week_of_month(day: u32) -> String {
    let week = (day.saturating_sub(1)) / 7 + 1;
    format!("minggu-{week}")
}

/// The four path components under which a day's attendance records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPath {
    /// Four-digit year, e.g. `2026`.
    pub year: String,
    /// Zero-padded two-digit month, `01`..`12`.
    pub month: String,
    /// Week token from [`week_of_month`].
    pub week: String,
    /// Zero-padded two-digit day of month, `01`..`31`.
    pub day: String,
}

impl PartitionPath {
    /// Derives the partition for the caller's current local date.
    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    /// Derives the partition for an arbitrary date. Used by reporting and
    /// by tests that need a fixed day.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            year: format!("{:04}", date.year()),
            month: format!("{:02}", date.month()),
            week: week_of_month(date.day()),
            day: format!("{:02}", date.day()),
        }
    }

    /// The `year-month-day` display string reporting groups by.
    pub fn date_string(&self) -> String {
        format!("{}-{}-{}", self.year, self.month, self.day)
    }
}

/// Formats an instant as the storage/display timestamp string.
pub fn format_timestamp(instant: DateTime<Local>) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        instant.year(),
        instant.month(),
        instant.day(),
        instant.hour(),
        instant.minute(),
        instant.second()
    )
}

/// Date half of a stored timestamp (`YYYY-MM-DD`), per the split-on-space
/// contract. Returns the whole string if no space is present.
pub fn date_part(timestamp: &str) -> &str {
    timestamp.split(' ').next().unwrap_or(timestamp)
}

/// Time half of a stored timestamp (`HH:mm:ss`), or `None` for strings that
/// do not carry one.
pub fn time_part(timestamp: &str) -> Option<&str> {
    timestamp.split(' ').nth(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn week_buckets_are_fixed_seven_day_spans() {
        assert_eq!(week_of_month(1), "minggu-1");
        assert_eq!(week_of_month(7), "minggu-1");
        assert_eq!(week_of_month(8), "minggu-2");
        assert_eq!(week_of_month(14), "minggu-2");
        assert_eq!(week_of_month(15), "minggu-3");
        assert_eq!(week_of_month(21), "minggu-3");
        assert_eq!(week_of_month(22), "minggu-4");
        assert_eq!(week_of_month(28), "minggu-4");
        assert_eq!(week_of_month(29), "minggu-5");
        assert_eq!(week_of_month(31), "minggu-5");
    }

    #[test]
    fn week_matches_ceiling_formula_for_every_day() {
        for day in 1..=31u32 {
            let expected = format!("minggu-{}", day.div_ceil(7));
            assert_eq!(week_of_month(day), expected, "day {day}");
        }
    }

    #[test]
    fn partition_components_are_zero_padded() {
        let path = PartitionPath::for_date(NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());
        assert_eq!(path.year, "2026");
        assert_eq!(path.month, "03");
        assert_eq!(path.week, "minggu-1");
        assert_eq!(path.day, "05");
        assert_eq!(path.date_string(), "2026-03-05");
    }

    #[test]
    fn timestamp_is_fixed_width_and_splits_on_space() {
        let instant = Local.with_ymd_and_hms(2026, 8, 9, 7, 4, 3).unwrap();
        let formatted = format_timestamp(instant);
        assert_eq!(formatted, "2026-08-09 07:04:03");
        assert_eq!(formatted.len(), 19);
        assert_eq!(date_part(&formatted), "2026-08-09");
        assert_eq!(time_part(&formatted), Some("07:04:03"));
    }

    #[test]
    fn timestamp_round_trips_through_split_contract() {
        let instant = Local.with_ymd_and_hms(2026, 12, 31, 23, 59, 58).unwrap();
        let formatted = format_timestamp(instant);
        let date = NaiveDate::parse_from_str(date_part(&formatted), "%Y-%m-%d").unwrap();
        assert_eq!(date, instant.date_naive());
        let reparsed =
            chrono::NaiveDateTime::parse_from_str(&formatted, TIMESTAMP_FORMAT).unwrap();
        assert_eq!(reparsed, instant.naive_local());
    }

    #[test]
    fn date_part_tolerates_missing_time() {
        assert_eq!(date_part("2024-01-01"), "2024-01-01");
        assert_eq!(time_part("2024-01-01"), None);
    }
}
