//! Cell date formatting.

use chrono::{DateTime, FixedOffset, Utc};

/// `dd-MMM-yyyy HH:mm:ss a`: 24-hour clock followed by an AM/PM marker.
///
/// The marker is redundant with the 24-hour clock and kept so existing
/// displays keep reading the same.
pub const TASK_DATE_PATTERN: &str = "%d-%b-%Y %H:%M:%S %p";

/// Formats a task date in the given display offset.
///
/// Month abbreviations and the marker are always English.
pub fn format_task_date(date: DateTime<Utc>, offset: &FixedOffset) -> String {
    date.with_timezone(offset)
        .format(TASK_DATE_PATTERN)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::format_task_date;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn afternoon_keeps_24_hour_clock_with_pm_marker() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 13, 45, 30).unwrap();
        assert_eq!(format_task_date(date, &utc()), "05-Jan-2024 13:45:30 PM");
    }

    #[test]
    fn morning_uses_am_marker_and_zero_padding() {
        let date = Utc.with_ymd_and_hms(2023, 9, 7, 9, 5, 7).unwrap();
        assert_eq!(format_task_date(date, &utc()), "07-Sep-2023 09:05:07 AM");
    }

    #[test]
    fn display_offset_shifts_wall_clock() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 8, 15, 30).unwrap();
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        assert_eq!(format_task_date(date, &ist), "05-Jan-2024 13:45:30 PM");
    }
}
