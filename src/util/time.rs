// SPDX-License-Identifier: MPL-2.0

use chrono::{DateTime, Utc};

/// Relative age of an RFC 3339 timestamp: seconds, minutes or hours, then
/// the plain date once it is a day old. Unparseable input gives an empty string.
pub fn time_ago(timestamp: &str) -> String {
    time_ago_at(timestamp, Utc::now())
}

pub fn time_ago_at(timestamp: &str, now: DateTime<Utc>) -> String {
    if timestamp.is_empty() {
        return String::new();
    }

    let Ok(then) = DateTime::parse_from_rfc3339(timestamp) else {
        return String::new();
    };

    // Clock skew can put server timestamps slightly in the future
    let duration = now.signed_duration_since(then).max(chrono::Duration::zero());

    if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else {
        then.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_seconds_minutes_hours() {
        assert_eq!(time_ago_at("2025-06-10T11:59:30Z", now()), "30s ago");
        assert_eq!(time_ago_at("2025-06-10T11:15:00Z", now()), "45m ago");
        assert_eq!(time_ago_at("2025-06-10T02:00:00Z", now()), "10h ago");
    }

    #[test]
    fn test_older_than_a_day_shows_date() {
        assert_eq!(time_ago_at("2025-06-08T09:00:00+09:00", now()), "2025-06-08");
    }

    #[test]
    fn test_future_timestamp_clamps_to_zero() {
        assert_eq!(time_ago_at("2025-06-10T12:00:05Z", now()), "0s ago");
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(time_ago_at("", now()), "");
        assert_eq!(time_ago_at("yesterday", now()), "");
    }
}
