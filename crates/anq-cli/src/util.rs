//! Shared parsing helpers for CLI arguments.

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::duration::parse_duration;

/// Parses an RFC 3339 timestamp (clap value parser for `--now`).
pub fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected RFC 3339 (e.g., 2026-01-15T10:30:00Z): {e}"))
}

/// Parses an instant as either RFC 3339 or a duration before `now`.
///
/// Supports:
/// - RFC 3339: "2026-01-15T10:30:00Z"
/// - Relative: "2h" (two hours before `now`), "0s" (`now` itself)
pub fn parse_instant(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let offset = parse_duration(s).with_context(|| {
        format!("invalid time {s:?}, use RFC 3339 (e.g., 2026-01-15T10:30:00Z) or a duration ago (e.g., 2h)")
    })?;
    now.checked_sub_signed(offset)
        .with_context(|| format!("time {s:?} before {now} is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0)
            .single()
            .expect("valid test timestamp")
    }

    #[test]
    fn parse_instant_accepts_rfc3339() {
        let parsed = parse_instant("2026-01-15T10:30:00+01:00", now()).unwrap();
        assert_eq!(
            parsed,
            Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).single().unwrap()
        );
    }

    #[test]
    fn parse_instant_accepts_relative_duration() {
        assert_eq!(parse_instant("90m", now()).unwrap(), now() - Duration::minutes(90));
        assert_eq!(parse_instant("0s", now()).unwrap(), now());
    }

    #[test]
    fn parse_instant_rejects_garbage() {
        let err = parse_instant("yesterday", now()).unwrap_err();
        assert!(err.to_string().contains("invalid time \"yesterday\""));
    }

    #[test]
    fn parse_rfc3339_reports_expected_format() {
        let err = parse_rfc3339("noon").unwrap_err();
        assert!(err.starts_with("expected RFC 3339"));
    }
}
