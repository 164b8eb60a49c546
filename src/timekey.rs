use crate::error::SearchError;

use chrono::{TimeZone, Timelike};

/// Canonical timestamp layout shared by input files, queries and output.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Projects a canonical timestamp onto a numeric key (seconds since the Unix epoch).
///
/// The timestamp carries no timezone, so it is read as UTC. The projection is
/// monotonic: chronological order of timestamps equals numeric order of keys,
/// which every search strategy relies on for its interpolation arithmetic.
///
/// # Arguments
/// * `timestamp` - A string in the format `YYYY-MM-DDTHH:MM:SS` (e.g., "2024-01-01T01:00:00").
///
/// # Returns
/// * `Result<f64, SearchError>` - The key, or `MalformedTimestamp` if parsing fails.
pub fn project(timestamp: &str) -> Result<f64, SearchError> {
    let dt = parse(timestamp, timestamp)?;
    Ok(dt.and_utc().timestamp() as f64)
}

/// Normalizes user or file input into the canonical timestamp form.
///
/// Surrounding whitespace is ignored and single-digit fields are padded
/// (`2024-1-1T1:00:00` becomes `2024-01-01T01:00:00`), so lexicographic and
/// chronological order agree on the result.
///
/// # Arguments
/// * `input` - Raw timestamp text.
///
/// # Returns
/// * `Result<String, SearchError>` - Canonical timestamp or `MalformedTimestamp`.
pub fn canonicalize(input: &str) -> Result<String, SearchError> {
    let dt = parse(input.trim(), input)?;
    Ok(dt.format(CANONICAL_FORMAT).to_string())
}

/// Parses `text` strictly; errors report `input` as given by the caller.
///
/// chrono reads second `60` as a leap second of the preceding one, which
/// would map two distinct timestamps onto one key, so it is rejected.
fn parse(text: &str, input: &str) -> Result<chrono::NaiveDateTime, SearchError> {
    let dt = chrono::NaiveDateTime::parse_from_str(text, CANONICAL_FORMAT)
        .map_err(|_| SearchError::malformed(input))?;
    if dt.nanosecond() >= 1_000_000_000 {
        return Err(SearchError::malformed(input));
    }
    Ok(dt)
}

/// Formats a numeric key back into a canonical timestamp.
///
/// Fractional seconds are truncated. Returns `None` for keys outside chrono's range.
pub fn format_key(key: f64) -> Option<String> {
    if !key.is_finite() {
        return None;
    }
    let dt = chrono::Utc.timestamp_opt(key.trunc() as i64, 0).single()?;
    Some(dt.format(CANONICAL_FORMAT).to_string())
}
