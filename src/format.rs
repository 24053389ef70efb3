use chrono::{DateTime, Utc};

/// Placeholder for counts and durations that no source could provide
pub const UNAVAILABLE: &str = "N/A";

/// Placeholder for a publish date that could not be determined
pub const UNKNOWN_DATE: &str = "Recently";

const SECONDS_PER_DAY: i64 = 86_400;

/// Compact a view count: `2.5M`, `1.5K`, or the plain number below a thousand.
///
/// Ties round up, so 1250 reads `1.3K`.
pub fn format_view_count(count: u64) -> String {
    if count >= 1_000_000 {
        with_one_decimal(count, 1_000_000, 'M')
    } else if count >= 1_000 {
        with_one_decimal(count, 1_000, 'K')
    } else {
        count.to_string()
    }
}

fn with_one_decimal(count: u64, unit: u64, suffix: char) -> String {
    let step = unit / 10;
    let tenths = (count + step / 2) / step;
    format!("{}.{}{suffix}", tenths / 10, tenths % 10)
}

/// Render an epoch-seconds publish timestamp relative to `now`.
///
/// Day counts round up, larger units round down. Units are never singularized
/// beyond "1 day ago", so 400 days reads "1 years ago".
pub fn format_published(timestamp: i64, now: DateTime<Utc>) -> String {
    let Some(published) = DateTime::from_timestamp(timestamp, 0) else {
        return UNKNOWN_DATE.to_string();
    };

    let diff_secs = (now - published).num_seconds().abs();
    let days = (diff_secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;

    if days == 1 {
        "1 day ago".to_string()
    } else if days < 7 {
        format!("{days} days ago")
    } else if days < 30 {
        format!("{} weeks ago", days / 7)
    } else if days < 365 {
        format!("{} months ago", days / 30)
    } else {
        format!("{} years ago", days / 365)
    }
}

/// Render a duration as `H:MM:SS`, or `M:SS` under an hour
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn days_before(days: i64) -> i64 {
        now().timestamp() - days * SECONDS_PER_DAY
    }

    #[test]
    fn test_view_count_small() {
        assert_eq!(format_view_count(0), "0");
        assert_eq!(format_view_count(999), "999");
    }

    #[test]
    fn test_view_count_thousands() {
        assert_eq!(format_view_count(1_000), "1.0K");
        assert_eq!(format_view_count(1_500), "1.5K");
    }

    #[test]
    fn test_view_count_millions() {
        assert_eq!(format_view_count(1_000_000), "1.0M");
        assert_eq!(format_view_count(2_500_000), "2.5M");
    }

    #[test]
    fn test_view_count_ties_round_up() {
        assert_eq!(format_view_count(1_250), "1.3K");
        assert_eq!(format_view_count(1_249), "1.2K");
        assert_eq!(format_view_count(2_250_000), "2.3M");
        assert_eq!(format_view_count(999_999), "1000.0K");
        assert_eq!(format_view_count(12_345_678), "12.3M");
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(600), "10:00");
    }

    #[test]
    fn test_duration_hours() {
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3661), "1:01:01");
    }

    #[test]
    fn test_published_one_day() {
        assert_eq!(format_published(days_before(1), now()), "1 day ago");
    }

    #[test]
    fn test_published_partial_day_rounds_up() {
        let ts = now().timestamp() - 3600;
        assert_eq!(format_published(ts, now()), "1 day ago");
        let ts = days_before(1) - 1;
        assert_eq!(format_published(ts, now()), "2 days ago");
    }

    #[test]
    fn test_published_same_instant() {
        assert_eq!(format_published(now().timestamp(), now()), "0 days ago");
    }

    #[test]
    fn test_published_days() {
        assert_eq!(format_published(days_before(3), now()), "3 days ago");
    }

    #[test]
    fn test_published_weeks() {
        assert_eq!(format_published(days_before(7), now()), "1 weeks ago");
        assert_eq!(format_published(days_before(20), now()), "2 weeks ago");
    }

    #[test]
    fn test_published_months() {
        assert_eq!(format_published(days_before(45), now()), "1 months ago");
        assert_eq!(format_published(days_before(364), now()), "12 months ago");
    }

    #[test]
    fn test_published_years_not_pluralized() {
        assert_eq!(format_published(days_before(400), now()), "1 years ago");
        assert_eq!(format_published(days_before(800), now()), "2 years ago");
    }

    #[test]
    fn test_published_future_uses_absolute_difference() {
        let ts = now().timestamp() + 3 * SECONDS_PER_DAY;
        assert_eq!(format_published(ts, now()), "3 days ago");
    }

    #[test]
    fn test_published_out_of_range() {
        assert_eq!(format_published(i64::MAX, now()), UNKNOWN_DATE);
    }
}
