//! Duration-string parsing for token TTLs.
//!
//! TTLs are configured as `<integer><unit>` where the unit is one of
//! `s`, `m`, `h`, `d`, `w`. A malformed value is a configuration-time
//! fatal error, never a runtime one.

use chrono::Duration;

use crate::error::AppError;

/// Parse a duration string such as `"15m"` or `"7d"`.
pub fn parse_duration(input: &str) -> Result<Duration, AppError> {
    let input = input.trim();
    if input.len() < 2 {
        return Err(bad_duration(input));
    }

    let (value, unit) = input.split_at(input.len() - 1);
    let value: i64 = value.parse().map_err(|_| bad_duration(input))?;
    if value <= 0 {
        return Err(bad_duration(input));
    }

    let duration = match unit {
        "s" => Duration::seconds(value),
        "m" => Duration::minutes(value),
        "h" => Duration::hours(value),
        "d" => Duration::days(value),
        "w" => Duration::weeks(value),
        _ => return Err(bad_duration(input)),
    };

    Ok(duration)
}

fn bad_duration(input: &str) -> AppError {
    AppError::configuration(format!(
        "Invalid duration '{input}': expected <integer><unit> with unit one of s, m, h, d, w"
    ))
}
