//! Interfaces to the collaborators the engine consumes.
//!
//! The engine never parses durations, stores annotations, or interprets filter
//! text itself. Implementations of these traits are supplied by the caller.

use chrono::Duration;

use crate::annotation::{Annotation, AnnotationFields};
use crate::error::BoxError;
use crate::window::TimeWindow;

/// Supplies candidate annotations for a window.
///
/// Results only need to approximately intersect the window; exact overlap is
/// re-derived by the classifier.
pub trait IntervalSource {
    fn fetch(&self, window: &TimeWindow) -> Result<Vec<Annotation>, BoxError>;
}

/// Parses relative duration text such as "2h".
pub trait DurationParser {
    fn parse(&self, text: &str) -> Result<Duration, BoxError>;
}

/// A compiled filter expression.
pub trait Predicate {
    fn evaluate(&self, annotation: &dyn AnnotationFields) -> Result<bool, BoxError>;
}

/// Compiles filter text into a [`Predicate`].
pub trait FilterCompiler {
    fn compile(&self, text: &str) -> Result<Box<dyn Predicate>, BoxError>;
}

impl<F> Predicate for F
where
    F: Fn(&dyn AnnotationFields) -> bool,
{
    fn evaluate(&self, annotation: &dyn AnnotationFields) -> Result<bool, BoxError> {
        Ok(self(annotation))
    }
}

impl IntervalSource for [Annotation] {
    fn fetch(&self, window: &TimeWindow) -> Result<Vec<Annotation>, BoxError> {
        Ok(self
            .iter()
            .filter(|a| a.start <= window.end && a.end >= window.start)
            .cloned()
            .collect())
    }
}
