//! Predicate gate applied to fetched annotations before aggregation.

use crate::annotation::Annotation;
use crate::error::QueryError;
use crate::source::Predicate;

/// Keeps the annotations accepted by `predicate`, in input order.
///
/// With no predicate every annotation passes. The first evaluation failure
/// aborts the whole pass.
pub fn apply(
    annotations: Vec<Annotation>,
    predicate: Option<&dyn Predicate>,
) -> Result<Vec<Annotation>, QueryError> {
    let Some(predicate) = predicate else {
        return Ok(annotations);
    };

    let mut kept = Vec::with_capacity(annotations.len());
    for annotation in annotations {
        let matched = predicate
            .evaluate(&annotation)
            .map_err(|source| QueryError::FilterEvaluation {
                annotation_id: annotation.id.to_string(),
                source,
            })?;
        if matched {
            kept.push(annotation);
        }
    }
    Ok(kept)
}
