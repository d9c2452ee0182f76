//! Aggregation strategies over classified annotations.
//!
//! Each strategy maps an annotation's position in the filtered sequence to a
//! number. The position is a row identity for a single response; it is not a
//! timestamp and must not be read as one.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::Serialize;

use crate::annotation::Annotation;
use crate::error::QueryError;
use crate::overlap::{Overlap, OverlapCase, classify};
use crate::window::TimeWindow;

/// Values keyed by synthetic row index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndexedSeries(BTreeMap<usize, f64>);

impl IndexedSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, value: f64) {
        self.0.insert(index, value);
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all values.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Iterates `(index, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.0.iter().map(|(index, value)| (*index, *value))
    }
}

/// A per-annotation weighting strategy.
pub trait Aggregator {
    /// Value contributed by one classified annotation.
    fn weigh(
        &self,
        annotation: &Annotation,
        overlap: &Overlap,
        window: &TimeWindow,
    ) -> Result<f64, QueryError>;
}

/// Every annotation counts as 1, whatever its overlap.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountAggregator;

/// Fraction of each annotation's own duration that lies inside the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedCountAggregator;

/// Seconds of each annotation covered by the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationAggregator;

impl Aggregator for CountAggregator {
    fn weigh(&self, _: &Annotation, _: &Overlap, _: &TimeWindow) -> Result<f64, QueryError> {
        Ok(1.0)
    }
}

impl Aggregator for WeightedCountAggregator {
    fn weigh(
        &self,
        annotation: &Annotation,
        overlap: &Overlap,
        window: &TimeWindow,
    ) -> Result<f64, QueryError> {
        ensure_consistent(annotation, overlap.case)?;
        let covered = match overlap.case {
            OverlapCase::FullyInside | OverlapCase::Spans | OverlapCase::Degenerate => {
                return Ok(1.0);
            }
            OverlapCase::NoOverlap => return Ok(0.0),
            OverlapCase::PartialLeft => annotation.end - window.start,
            OverlapCase::PartialRight => window.end - annotation.start,
        };
        Ok(as_seconds(covered) / as_seconds(annotation.duration()))
    }
}

impl Aggregator for DurationAggregator {
    fn weigh(
        &self,
        annotation: &Annotation,
        overlap: &Overlap,
        window: &TimeWindow,
    ) -> Result<f64, QueryError> {
        ensure_consistent(annotation, overlap.case)?;
        let covered = match overlap.case {
            OverlapCase::FullyInside => annotation.duration(),
            // Clamped to the window so a long annotation never reports more
            // time than the window holds.
            OverlapCase::Spans => window.length(),
            OverlapCase::PartialLeft => annotation.end - window.start,
            OverlapCase::PartialRight => window.end - annotation.start,
            OverlapCase::Degenerate | OverlapCase::NoOverlap => Duration::zero(),
        };
        Ok(as_seconds(covered))
    }
}

/// Classifies each annotation and collects the strategy's values by index.
pub fn aggregate<A: Aggregator + ?Sized>(
    aggregator: &A,
    annotations: &[Annotation],
    window: &TimeWindow,
) -> Result<IndexedSeries, QueryError> {
    let mut series = IndexedSeries::new();
    for (index, annotation) in annotations.iter().enumerate() {
        let overlap = classify(annotation, window);
        if overlap.case == OverlapCase::NoOverlap {
            tracing::warn!(
                annotation_id = %annotation.id,
                start = %annotation.start,
                end = %annotation.end,
                "annotation does not overlap query window"
            );
        }
        let value = aggregator.weigh(annotation, &overlap, window)?;
        series.insert(index, value);
    }
    Ok(series)
}

/// A zero-length annotation can never partially overlap anything; seeing one
/// means the source or the classifier is broken.
fn ensure_consistent(annotation: &Annotation, case: OverlapCase) -> Result<(), QueryError> {
    if case.is_partial() && annotation.is_instant() {
        return Err(QueryError::InconsistentAnnotation {
            annotation_id: annotation.id.to_string(),
        });
    }
    Ok(())
}

/// Converts a duration to fractional seconds without rounding.
#[allow(clippy::cast_precision_loss)]
pub fn as_seconds(duration: Duration) -> f64 {
    duration.num_seconds() as f64 + f64::from(duration.subsec_nanos()) / 1e9
}
