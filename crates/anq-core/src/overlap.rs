//! Overlap classification between an annotation and a query window.
//!
//! # Cases
//!
//! Cases are tested in priority order; the first match wins:
//!
//! 1. `FullyInside` - annotation lies within the window (boundaries inclusive)
//! 2. `Spans` - annotation covers the whole window
//! 3. `PartialLeft` - starts before the window, ends inside it
//! 4. `PartialRight` - starts inside the window, ends after it
//! 5. `Degenerate` - zero-length annotation touching the window, not matched above
//! 6. `NoOverlap` - everything else
//!
//! The store's window filter is only approximate, so geometry is always
//! re-derived here.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::annotation::Annotation;
use crate::window::TimeWindow;

/// Geometric relationship between an annotation and the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapCase {
    FullyInside,
    Spans,
    PartialLeft,
    PartialRight,
    Degenerate,
    NoOverlap,
}

impl OverlapCase {
    /// Returns true for the two partial cases.
    pub const fn is_partial(self) -> bool {
        matches!(self, Self::PartialLeft | Self::PartialRight)
    }
}

/// The clipped intersection of an annotation and the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub case: OverlapCase,
    /// `[max(starts), min(ends)]`, or `None` when the two do not meet.
    /// A single shared instant yields a zero-length clip.
    pub clipped: Option<TimeWindow>,
}

impl Overlap {
    /// Length of the clipped region, zero when there is none.
    pub fn clipped_length(&self) -> Duration {
        self.clipped.map_or_else(Duration::zero, |c| c.length())
    }
}

/// Classifies a single annotation against the window.
///
/// Every annotation is `NoOverlap` against an inverted window.
pub fn classify(annotation: &Annotation, window: &TimeWindow) -> Overlap {
    let case = classify_interval(annotation.start, annotation.end, window);
    Overlap {
        case,
        clipped: clip(annotation.start, annotation.end, window),
    }
}

fn classify_interval(start: DateTime<Utc>, end: DateTime<Utc>, window: &TimeWindow) -> OverlapCase {
    if window.is_inverted() {
        return OverlapCase::NoOverlap;
    }

    if start >= window.start && end <= window.end {
        OverlapCase::FullyInside
    } else if start <= window.start && end >= window.end {
        OverlapCase::Spans
    } else if start < window.start && end > window.start && end <= window.end {
        OverlapCase::PartialLeft
    } else if end > window.end && start >= window.start && start < window.end {
        OverlapCase::PartialRight
    } else if start == end && start >= window.start && start <= window.end {
        OverlapCase::Degenerate
    } else {
        OverlapCase::NoOverlap
    }
}

fn clip(start: DateTime<Utc>, end: DateTime<Utc>, window: &TimeWindow) -> Option<TimeWindow> {
    if window.is_inverted() {
        return None;
    }
    let clipped_start = start.max(window.start);
    let clipped_end = end.min(window.end);
    (clipped_start <= clipped_end).then(|| TimeWindow::new(clipped_start, clipped_end))
}
