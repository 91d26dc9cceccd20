//! Parsing and formatting of schedule dates and times.

use anyhow::{Result, anyhow, bail};
use chrono::{NaiveDate, NaiveTime, Timelike};

use daybook_core::entity::TimeRange;

/// `2024-07-04` -> `20240704`
pub fn parse_date(input: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid date '{input}', expected YYYY-MM-DD"))?;
    Ok(date.format("%Y%m%d").to_string())
}

/// Minutes since midnight of an `HH:MM` time.
pub fn parse_time(input: &str) -> Result<i32> {
    let time = NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map_err(|_| anyhow!("Invalid time '{input}', expected HH:MM"))?;
    Ok((time.hour() * 60 + time.minute()) as i32)
}

/// Build a time range; no start means all-day, no end means one hour.
pub fn parse_time_range(start: Option<&str>, end: Option<&str>) -> Result<TimeRange> {
    let Some(start) = start else {
        return Ok(TimeRange::unset());
    };
    let start = parse_time(start)?;
    let end = match end {
        Some(end) => parse_time(end)?,
        None => (start + 60).min(24 * 60 - 1),
    };
    if end < start {
        bail!("End time must not be before start time");
    }
    Ok(TimeRange { start, end })
}

/// The calendar day of a compact `YYYYMMDD` date.
pub fn day_of(compact: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(compact, "%Y%m%d").ok()
}

pub fn format_minutes(minutes: i32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// "Today", "Tomorrow" or e.g. "Wed Feb 25"
pub fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    match (day - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => day.format("%a %b %-d %Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-07-04").unwrap(), "20240704");
        assert!(parse_date("07/04/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_time_range() {
        assert!(parse_time_range(None, None).unwrap().is_unset());

        let range = parse_time_range(Some("09:30"), Some("10:15")).unwrap();
        assert_eq!(range, TimeRange { start: 570, end: 615 });

        let range = parse_time_range(Some("23:30"), None).unwrap();
        assert_eq!(range.end, 1439);

        assert!(parse_time_range(Some("10:00"), Some("09:00")).is_err());
        assert!(parse_time_range(Some("25:00"), None).is_err());
    }

    #[test]
    fn test_day_label() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 24).unwrap();
        assert_eq!(day_label(today, today), "Today");
        assert_eq!(day_label(today.succ_opt().unwrap(), today), "Tomorrow");
        assert_eq!(day_label(day_of("20250226").unwrap(), today), "Wed Feb 26 2025");
        assert_eq!(format_minutes(570), "09:30");
    }
}
