//! OpenTSDB-style relative durations (`30m`, `2h`, `1w`).

use std::sync::LazyLock;

use anq_core::{BoxError, DurationParser};
use chrono::Duration;
use regex::Regex;
use thiserror::Error;

/// Pre-compiled regex for `<count><unit>` durations.
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(ms|s|m|h|d|w|n|y)$").unwrap());

/// Duration parse errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("invalid duration {0:?}, expected <number><unit> with unit one of ms, s, m, h, d, w, n, y")]
    Malformed(String),
    #[error("duration {0:?} is out of range")]
    OutOfRange(String),
}

/// Parses durations like `90s` or `2h`.
///
/// Units: `ms`, `s`, `m`, `h`, `d`, `w`, `n` (30 days), `y` (365 days).
pub fn parse_duration(text: &str) -> Result<Duration, DurationError> {
    let Some(caps) = DURATION_RE.captures(text) else {
        return Err(DurationError::Malformed(text.to_string()));
    };

    let count: i64 = caps[1]
        .parse()
        .map_err(|_| DurationError::OutOfRange(text.to_string()))?;

    let unit_ms: i64 = match &caps[2] {
        "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        "w" => 7 * 86_400_000,
        "n" => 30 * 86_400_000,
        "y" => 365 * 86_400_000,
        _ => return Err(DurationError::Malformed(text.to_string())),
    };

    count
        .checked_mul(unit_ms)
        .and_then(Duration::try_milliseconds)
        .ok_or_else(|| DurationError::OutOfRange(text.to_string()))
}

/// [`DurationParser`] backed by [`parse_duration`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenTsdbDuration;

impl DurationParser for OpenTsdbDuration {
    fn parse(&self, text: &str) -> Result<Duration, BoxError> {
        Ok(parse_duration(text)?)
    }
}
