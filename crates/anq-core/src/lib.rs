//! Core domain logic for annotation queries.
//!
//! This crate contains the interval-overlap aggregation engine:
//! - Window resolution: relative offsets to an absolute query window
//! - Overlap classification: the geometry between an annotation and the window
//! - Aggregation: counts, weighted counts and covered durations
//! - Table projection of annotation fields
//!
//! Storage, duration parsing and the filter language are supplied by callers
//! through the traits in [`source`].

pub mod aggregate;
pub mod annotation;
pub mod engine;
mod error;
pub mod filter;
pub mod overlap;
pub mod source;
pub mod table;
mod types;
pub mod window;

pub use aggregate::{
    Aggregator, CountAggregator, DurationAggregator, IndexedSeries, WeightedCountAggregator,
};
pub use annotation::{Annotation, AnnotationFields, Field, UnknownField};
pub use engine::{AggregationResult, QueryEngine};
pub use error::{BoxError, QueryError};
pub use overlap::{Overlap, OverlapCase, classify};
pub use source::{DurationParser, FilterCompiler, IntervalSource, Predicate};
pub use table::{Column, Table, Value, hhmmss};
pub use types::{AnnotationId, ValidationError};
pub use window::{OffsetOutOfRange, TimeWindow};
