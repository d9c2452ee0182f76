//! Query window resolution.
//!
//! A window is derived from two offsets measured backwards from a reference
//! instant: `[reference - start_offset, reference - end_offset]`.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::error::{BoxError, QueryError};
use crate::source::DurationParser;

/// An offset reaches past the representable range of instants.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("offset {offset} before {reference} is out of range")]
pub struct OffsetOutOfRange {
    pub reference: DateTime<Utc>,
    pub offset: Duration,
}

/// Absolute time range a query is evaluated against.
///
/// `start <= end` is not enforced. An inverted window is legal and overlaps
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Resolves a window from already-parsed offsets.
    ///
    /// An absent `end_offset` means the window ends at `reference`.
    pub fn resolve(
        reference: DateTime<Utc>,
        start_offset: Duration,
        end_offset: Option<Duration>,
    ) -> Result<Self, OffsetOutOfRange> {
        let end_offset = end_offset.unwrap_or_else(Duration::zero);
        Ok(Self {
            start: back_from(reference, start_offset)?,
            end: back_from(reference, end_offset)?,
        })
    }

    /// Resolves a window from offset text using an external parser.
    ///
    /// An empty `end_text` is treated as absent.
    pub fn resolve_text<P: DurationParser + ?Sized>(
        parser: &P,
        reference: DateTime<Utc>,
        start_text: &str,
        end_text: &str,
    ) -> Result<Self, QueryError> {
        let start = boundary(parser, reference, start_text)?;
        let end = if end_text.trim().is_empty() {
            reference
        } else {
            boundary(parser, reference, end_text)?
        };
        Ok(Self::new(start, end))
    }

    /// Length of the window. Negative for an inverted window.
    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    /// Returns true if the window starts after it ends.
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

fn back_from(reference: DateTime<Utc>, offset: Duration) -> Result<DateTime<Utc>, OffsetOutOfRange> {
    reference
        .checked_sub_signed(offset)
        .ok_or(OffsetOutOfRange { reference, offset })
}

/// Parses `text` and steps back from `reference` by it.
fn boundary<P: DurationParser + ?Sized>(
    parser: &P,
    reference: DateTime<Utc>,
    text: &str,
) -> Result<DateTime<Utc>, QueryError> {
    let invalid = |source: BoxError| QueryError::InvalidDuration {
        text: text.to_string(),
        source,
    };
    let offset = parser.parse(text.trim()).map_err(invalid)?;
    back_from(reference, offset).map_err(|err| invalid(err.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Parses bare minute counts, e.g. "90".
    struct MinutesParser;

    impl DurationParser for MinutesParser {
        fn parse(&self, text: &str) -> Result<Duration, BoxError> {
            let minutes: i64 = text.parse()?;
            Ok(Duration::minutes(minutes))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0)
            .single()
            .expect("valid test timestamp")
    }

    #[test]
    fn resolve_subtracts_offsets_from_reference() {
        let window = TimeWindow::resolve(now(), Duration::hours(2), Some(Duration::hours(1))).unwrap();
        assert_eq!(window.start, now() - Duration::hours(2));
        assert_eq!(window.end, now() - Duration::hours(1));
        assert_eq!(window.length(), Duration::hours(1));
    }

    #[test]
    fn absent_end_offset_ends_at_reference() {
        let window = TimeWindow::resolve(now(), Duration::minutes(30), None).unwrap();
        assert_eq!(window.end, now());
        assert!(!window.is_inverted());
    }

    #[test]
    fn start_offset_smaller_than_end_offset_inverts_window() {
        let window = TimeWindow::resolve(now(), Duration::hours(1), Some(Duration::hours(2))).unwrap();
        assert!(window.is_inverted());
        assert!(window.length() < Duration::zero());
    }

    #[test]
    fn resolve_text_treats_blank_end_as_absent() {
        let window = TimeWindow::resolve_text(&MinutesParser, now(), "60", "  ").unwrap();
        assert_eq!(window, TimeWindow::new(now() - Duration::hours(1), now()));
    }

    #[test]
    fn resolve_text_surfaces_parser_failures() {
        let err = TimeWindow::resolve_text(&MinutesParser, now(), "60", "soon").unwrap_err();
        match err {
            QueryError::InvalidDuration { text, .. } => assert_eq!(text, "soon"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn resolve_rejects_offset_past_representable_range() {
        let huge = Duration::try_milliseconds(300_000 * 365 * 86_400_000).unwrap();
        let err = TimeWindow::resolve(now(), huge, None).unwrap_err();
        assert_eq!(err, OffsetOutOfRange { reference: now(), offset: huge });
    }

    #[test]
    fn resolve_text_reports_out_of_range_offset_as_invalid_duration() {
        // 300000 years in minutes.
        let err = TimeWindow::resolve_text(&MinutesParser, now(), "157680000000", "")
            .unwrap_err();
        match err {
            QueryError::InvalidDuration { text, source } => {
                assert_eq!(text, "157680000000");
                assert!(source.to_string().contains("out of range"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
