//! Shared formatting utilities for the CoolWatch views.

use chrono::{NaiveDateTime, Utc};

/// Format a numeric value for display with appropriate scale suffix.
///
/// - Values >= 1M display as "X.XM"
/// - Values >= 1K display as "X.XK"
/// - Integer values display without decimal places
/// - Other values display with 2 decimal places
pub fn format_value(value: f64) -> String {
    if value.abs() >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value.abs() >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Format a temperature in degrees Celsius with one decimal.
pub fn format_temperature(value: f64) -> String {
    format!("{:.1}°C", value)
}

/// Format a timestamp as a relative time string.
///
/// Returns strings like "just now", "5s ago", "3m ago", "2h ago".
/// Backend timestamps are naive UTC.
pub fn format_relative(timestamp: NaiveDateTime) -> String {
    let diff = Utc::now().naive_utc() - timestamp;
    let secs = diff.num_seconds();

    if secs < 1 {
        "just now".to_string()
    } else if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86400 {
        format!("{}h ago", secs / 3600)
    } else {
        format!("{}d ago", secs / 86400)
    }
}

/// Format a timestamp as an absolute date-time string.
pub fn format_datetime(timestamp: NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(42.0), "42");
        assert_eq!(format_value(3.14159), "3.14");
        assert_eq!(format_value(1500.0), "1.5K");
        assert_eq!(format_value(2500000.0), "2.5M");
        assert_eq!(format_value(-1500.0), "-1.5K");
    }

    #[test]
    fn test_format_temperature() {
        assert_eq!(format_temperature(22.54), "22.5°C");
        assert_eq!(format_temperature(-3.0), "-3.0°C");
    }

    #[test]
    fn test_format_datetime() {
        let ts =
            NaiveDateTime::parse_from_str("2024-03-02T10:15:30", "%Y-%m-%dT%H:%M:%S").unwrap();
        assert_eq!(format_datetime(ts), "2024-03-02 10:15:30");
    }

    #[test]
    fn test_format_relative_past() {
        let five_minutes_ago = Utc::now().naive_utc() - chrono::Duration::minutes(5);
        assert_eq!(format_relative(five_minutes_ago), "5m ago");
    }
}
