//! Query errors.

use thiserror::Error;

/// Boxed error returned by external collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort a query. No query ever returns a partial result.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A window offset could not be parsed.
    #[error("invalid duration {text:?}")]
    InvalidDuration {
        text: String,
        #[source]
        source: BoxError,
    },

    /// The filter text could not be compiled.
    #[error("invalid filter {text:?}")]
    InvalidFilter {
        text: String,
        #[source]
        source: BoxError,
    },

    /// The filter predicate failed on a specific annotation.
    #[error("filter evaluation failed for annotation {annotation_id}")]
    FilterEvaluation {
        annotation_id: String,
        #[source]
        source: BoxError,
    },

    /// The interval source could not be queried.
    #[error("annotation source unavailable")]
    SourceUnavailable(#[source] BoxError),

    /// A requested table column is not recognized.
    #[error(
        "{0} is not a valid column, must be start, end, owner, user, host, category, url, message, or duration"
    )]
    UnknownColumn(String),

    /// No table columns were requested.
    #[error("must specify at least one column")]
    EmptyColumnList,

    /// A zero-length annotation was classified as partially overlapping.
    #[error("annotation {annotation_id} has zero duration but partially overlaps the query window")]
    InconsistentAnnotation { annotation_id: String },
}
