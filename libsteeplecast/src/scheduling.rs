//! Schedule-time parsing
//!
//! Parses human-readable time formats for scheduling content. Nothing in
//! this crate fires a post at its scheduled time; the parsed value is stored
//! on the content row for an external scheduler to consume.

use chrono::{DateTime, Duration, Utc};

use crate::{Result, SteeplecastError};

/// Parse a schedule string into a DateTime
///
/// Supports relative durations ("1h", "30m", "2d") and natural language
/// ("tomorrow", "next sunday 10am", "2026-12-24 18:00").
///
/// # Errors
///
/// Returns an error if the time format is invalid or the parsed time is in
/// the past.
pub fn parse_schedule(input: &str) -> Result<DateTime<Utc>> {
    if input.trim().is_empty() {
        return Err(SteeplecastError::InvalidInput(
            "Schedule string cannot be empty".to_string(),
        ));
    }

    let parsed = parse_duration(input)
        .map(|d| Utc::now() + d)
        .or_else(|_| parse_natural_language(input))?;

    if parsed <= Utc::now() {
        return Err(SteeplecastError::InvalidInput(format!(
            "Scheduled time '{}' is in the past",
            input
        )));
    }

    Ok(parsed)
}

/// Parse a duration string into a chrono::Duration
fn parse_duration(input: &str) -> Result<Duration> {
    if let Ok(std_duration) = humantime::parse_duration(input) {
        let seconds = std_duration.as_secs() as i64;
        return Duration::try_seconds(seconds)
            .ok_or_else(|| SteeplecastError::InvalidInput("Duration out of range".to_string()));
    }

    Err(SteeplecastError::InvalidInput(format!(
        "Could not parse duration: {}",
        input
    )))
}

/// Parse natural language time expression
fn parse_natural_language(input: &str) -> Result<DateTime<Utc>> {
    chrono_english::parse_date_string(input, Utc::now(), chrono_english::Dialect::Us)
        .map_err(|e| SteeplecastError::InvalidInput(format!("Could not parse time: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_minutes() {
        let scheduled = parse_schedule("30m").unwrap();
        let diff = (scheduled - Utc::now()).num_minutes();
        assert!((29..=30).contains(&diff));
    }

    #[test]
    fn test_parse_duration_hours() {
        let scheduled = parse_schedule("2h").unwrap();
        let diff = (scheduled - Utc::now()).num_minutes();
        assert!((119..=120).contains(&diff));
    }

    #[test]
    fn test_parse_natural_language_tomorrow() {
        let scheduled = parse_schedule("tomorrow").unwrap();
        assert!(scheduled > Utc::now());
    }

    #[test]
    fn test_parse_empty_string() {
        let result = parse_schedule("");
        assert!(matches!(result, Err(SteeplecastError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_garbage() {
        let result = parse_schedule("not a time at all %%%");
        assert!(result.is_err());
    }

    #[test]
    fn test_past_time_rejected() {
        let result = parse_schedule("2001-01-01 10:00");
        assert!(matches!(result, Err(SteeplecastError::InvalidInput(_))));
    }
}
