//! Date-time helpers
//!
//! Zabbix reports unix timestamps (as strings). Everything shown to chat
//! users is in the bot's local time zone.

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Timelike};

/// Display format for date-times in replies
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Input format for outage start/end arguments
pub const OUTAGE_INPUT_FORMAT: &str = "%Y-%m-%d-%H-%M";

/// Convert a unix timestamp into local date-time
pub fn get_datetime(timestamp: i64) -> Option<DateTime<Local>> {
    Local.timestamp_opt(timestamp, 0).single()
}

/// Parse a Zabbix timestamp string (e.g. `"1420070400"`)
pub fn parse_timestamp(value: &str) -> Option<DateTime<Local>> {
    value.trim().parse::<i64>().ok().and_then(get_datetime)
}

/// Format a date-time for display
pub fn convert_datetime(dt: &DateTime<Local>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Format a Zabbix timestamp string for display.
/// Unparsable input is returned unchanged.
pub fn timestamp_to_datetime(value: &str) -> String {
    parse_timestamp(value)
        .map(|dt| convert_datetime(&dt))
        .unwrap_or_else(|| value.to_string())
}

/// Human readable age of `dt` relative to `now`
pub fn get_age(dt: &DateTime<Local>, now: &DateTime<Local>) -> String {
    let delta = (*now - *dt).max(Duration::zero());
    let days = delta.num_days();
    let rem = delta.num_seconds() - days * 86_400;
    let (hours, rem) = (rem / 3600, rem % 3600);
    let (minutes, seconds) = (rem / 60, rem % 60);

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else {
        format!("{}h {}m {}s", hours, minutes, seconds)
    }
}

/// Parse an outage argument in `YYYY-mm-dd-HH-MM` form as local time
pub fn parse_outage_datetime(value: &str) -> Option<DateTime<Local>> {
    NaiveDateTime::parse_from_str(value, OUTAGE_INPUT_FORMAT)
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}

/// Next wall-clock minute divisible by `step_minutes`, strictly after `now`
pub fn next_cron_run(now: &DateTime<Local>, step_minutes: u32) -> DateTime<Local> {
    let step = step_minutes.clamp(1, 60);
    let truncated = now
        .with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(*now);
    let minute = truncated.minute();
    let advance = step - (minute % step);

    truncated + Duration::minutes(i64::from(advance))
}

/// Pad `text` with spaces on the right up to `width` characters
pub fn ljust(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).earliest().unwrap()
    }

    #[test]
    fn test_age_under_a_day() {
        let now = local(2024, 3, 10, 12, 0, 0);
        let dt = local(2024, 3, 10, 9, 25, 30);
        assert_eq!(get_age(&dt, &now), "2h 34m 30s");
    }

    #[test]
    fn test_age_over_a_day() {
        let now = local(2024, 3, 12, 12, 0, 0);
        let dt = now - Duration::seconds(2 * 86_400 + 3 * 3600 + 4 * 60 + 5);
        assert_eq!(get_age(&dt, &now), "2d 3h 4m");
    }

    #[test]
    fn test_age_in_future_is_zero() {
        let now = local(2024, 3, 10, 12, 0, 0);
        let dt = now + Duration::minutes(10);
        assert_eq!(get_age(&dt, &now), "0h 0m 0s");
    }

    #[test]
    fn test_timestamp_roundtrip_display() {
        let dt = local(2024, 1, 2, 3, 4, 5);
        let shown = timestamp_to_datetime(&dt.timestamp().to_string());
        assert_eq!(shown, "2024-01-02 03:04:05");
        assert_eq!(timestamp_to_datetime("garbage"), "garbage");
    }

    #[test]
    fn test_parse_outage_datetime() {
        let dt = parse_outage_datetime("2024-05-06-07-08").unwrap();
        assert_eq!(convert_datetime(&dt), "2024-05-06 07:08:00");
        assert!(parse_outage_datetime("2024-05-06 07:08").is_none());
        assert!(parse_outage_datetime("tomorrow").is_none());
    }

    #[test]
    fn test_next_cron_run() {
        let now = local(2024, 3, 10, 12, 3, 17);
        assert_eq!(next_cron_run(&now, 5), local(2024, 3, 10, 12, 5, 0));

        let on_boundary = local(2024, 3, 10, 12, 5, 0);
        assert_eq!(next_cron_run(&on_boundary, 5), local(2024, 3, 10, 12, 10, 0));

        let end_of_hour = local(2024, 3, 10, 12, 58, 59);
        assert_eq!(next_cron_run(&end_of_hour, 5), local(2024, 3, 10, 13, 0, 0));
    }

    #[test]
    fn test_ljust() {
        assert_eq!(ljust("High", 12), "High        ");
        assert_eq!(ljust("Not classified", 12), "Not classified");
    }
}
