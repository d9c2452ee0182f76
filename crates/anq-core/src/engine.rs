//! Query entry points.
//!
//! All four operations share window resolution and filter semantics:
//!
//! 1. Resolve the window from the offset text and the reference instant
//! 2. Compile the filter (empty text means no filter)
//! 3. Fetch candidates and pass them through the filter gate
//! 4. Aggregate or project
//!
//! Request validation (columns, durations, filter) always happens before the
//! fetch, so a malformed request never touches the source.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{
    Aggregator, CountAggregator, DurationAggregator, IndexedSeries, WeightedCountAggregator,
    aggregate,
};
use crate::annotation::Annotation;
use crate::error::QueryError;
use crate::filter;
use crate::source::{DurationParser, FilterCompiler, IntervalSource, Predicate};
use crate::table::{Table, parse_columns, project};
use crate::window::TimeWindow;

/// Result of a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AggregationResult {
    Scalar(f64),
    Series(IndexedSeries),
    Table(Table),
}

/// Evaluates annotation queries against a source at a fixed reference instant.
pub struct QueryEngine<'a, S: ?Sized, P: ?Sized, F: ?Sized> {
    source: &'a S,
    durations: &'a P,
    filters: &'a F,
    now: DateTime<Utc>,
}

impl<'a, S, P, F> QueryEngine<'a, S, P, F>
where
    S: IntervalSource + ?Sized,
    P: DurationParser + ?Sized,
    F: FilterCompiler + ?Sized,
{
    pub const fn new(source: &'a S, durations: &'a P, filters: &'a F, now: DateTime<Utc>) -> Self {
        Self {
            source,
            durations,
            filters,
            now,
        }
    }

    /// Number of annotations matching the filter in the window.
    #[allow(clippy::cast_precision_loss)]
    pub fn count(&self, filter: &str, start: &str, end: &str) -> Result<AggregationResult, QueryError> {
        let (window, annotations) = self.matching(filter, start, end)?;
        let series = aggregate(&CountAggregator, &annotations, &window)?;
        Ok(AggregationResult::Scalar(series.len() as f64))
    }

    /// Per-annotation fraction of its duration inside the window.
    pub fn weighted_count(
        &self,
        filter: &str,
        start: &str,
        end: &str,
    ) -> Result<AggregationResult, QueryError> {
        self.series(&WeightedCountAggregator, filter, start, end)
    }

    /// Per-annotation seconds covered by the window.
    pub fn total_duration(
        &self,
        filter: &str,
        start: &str,
        end: &str,
    ) -> Result<AggregationResult, QueryError> {
        self.series(&DurationAggregator, filter, start, end)
    }

    /// Projection of the requested columns for every matching annotation.
    pub fn table(
        &self,
        filter: &str,
        columns_csv: &str,
        start: &str,
        end: &str,
    ) -> Result<AggregationResult, QueryError> {
        let columns = parse_columns(columns_csv)?;
        let (_, annotations) = self.matching(filter, start, end)?;
        Ok(AggregationResult::Table(project(&annotations, &columns)))
    }

    fn series<A: Aggregator>(
        &self,
        aggregator: &A,
        filter: &str,
        start: &str,
        end: &str,
    ) -> Result<AggregationResult, QueryError> {
        let (window, annotations) = self.matching(filter, start, end)?;
        let series = aggregate(aggregator, &annotations, &window)?;
        Ok(AggregationResult::Series(series))
    }

    fn matching(
        &self,
        filter: &str,
        start: &str,
        end: &str,
    ) -> Result<(TimeWindow, Vec<Annotation>), QueryError> {
        let window = TimeWindow::resolve_text(self.durations, self.now, start, end)?;
        tracing::debug!(start = %window.start, end = %window.end, "resolved query window");

        let predicate = self.compile(filter)?;

        let fetched = self
            .source
            .fetch(&window)
            .map_err(QueryError::SourceUnavailable)?;
        let fetched_count = fetched.len();

        let kept = filter::apply(fetched, predicate.as_deref())?;
        tracing::debug!(fetched = fetched_count, kept = kept.len(), "filtered annotations");

        Ok((window, kept))
    }

    fn compile(&self, filter: &str) -> Result<Option<Box<dyn Predicate>>, QueryError> {
        let text = filter.trim();
        if text.is_empty() {
            return Ok(None);
        }
        self.filters
            .compile(text)
            .map(Some)
            .map_err(|source| QueryError::InvalidFilter {
                text: text.to_string(),
                source,
            })
    }
}
