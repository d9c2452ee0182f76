//! Field glob filters.
//!
//! A filter is a list of `key:pattern` terms joined by `AND` / `OR`, where
//! `AND` binds tighter than `OR` and a leading `!` negates a term. Keys are
//! annotation fields (`owner`, `user`, `host`, `category`, `url`, `message`,
//! `source`); `*` in a pattern matches any run of characters.
//!
//! ```text
//! owner:sre AND host:db* OR category:outage AND !message:*test*
//! ```
//!
//! Terms are whitespace separated, so patterns cannot contain spaces; use `*`.

use anq_core::{AnnotationFields, BoxError, Field, FilterCompiler, Predicate, UnknownField};
use regex::Regex;
use thiserror::Error;

/// Filter compilation errors.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("bad filter term {0:?}, terms must be in key:pattern format")]
    MissingSeparator(String),
    #[error(transparent)]
    UnknownField(#[from] UnknownField),
    #[error("expected a term after {0:?}")]
    DanglingOperator(String),
    #[error("expected AND or OR before {0:?}")]
    MissingOperator(String),
    #[error("invalid pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A single `[!]key:pattern` test.
#[derive(Debug)]
struct Term {
    field: Field,
    pattern: Regex,
    negated: bool,
}

impl Term {
    fn parse(token: &str) -> Result<Self, FilterError> {
        let (negated, body) = match token.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        let Some((key, pattern)) = body.split_once(':') else {
            return Err(FilterError::MissingSeparator(token.to_string()));
        };
        let field: Field = key.parse()?;
        Ok(Self {
            field,
            pattern: glob_to_regex(pattern)?,
            negated,
        })
    }

    fn matches(&self, annotation: &dyn AnnotationFields) -> bool {
        self.pattern.is_match(annotation.field(self.field)) != self.negated
    }
}

/// A compiled filter: a disjunction of conjunctions.
#[derive(Debug)]
pub struct FilterExpr {
    groups: Vec<Vec<Term>>,
}

impl FilterExpr {
    pub fn parse(text: &str) -> Result<Self, FilterError> {
        let mut groups = vec![Vec::new()];
        let mut pending_operator: Option<&str> = Some("");

        for token in text.split_whitespace() {
            match token {
                "AND" | "OR" => {
                    if pending_operator.is_some() {
                        return Err(FilterError::DanglingOperator(token.to_string()));
                    }
                    if token == "OR" {
                        groups.push(Vec::new());
                    }
                    pending_operator = Some(token);
                }
                _ => {
                    if pending_operator.is_none() {
                        return Err(FilterError::MissingOperator(token.to_string()));
                    }
                    let term = Term::parse(token)?;
                    if let Some(group) = groups.last_mut() {
                        group.push(term);
                    }
                    pending_operator = None;
                }
            }
        }

        if let Some(operator) = pending_operator.filter(|op| !op.is_empty()) {
            return Err(FilterError::DanglingOperator(operator.to_string()));
        }
        groups.retain(|group| !group.is_empty());
        Ok(Self { groups })
    }
}

impl Predicate for FilterExpr {
    fn evaluate(&self, annotation: &dyn AnnotationFields) -> Result<bool, BoxError> {
        if self.groups.is_empty() {
            return Ok(true);
        }
        Ok(self
            .groups
            .iter()
            .any(|group| group.iter().all(|term| term.matches(annotation))))
    }
}

/// [`FilterCompiler`] for the glob filter language.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobFilterCompiler;

impl FilterCompiler for GlobFilterCompiler {
    fn compile(&self, text: &str) -> Result<Box<dyn Predicate>, BoxError> {
        Ok(Box::new(FilterExpr::parse(text)?))
    }
}

/// Anchored regex equivalent of a `*` glob.
fn glob_to_regex(pattern: &str) -> Result<Regex, FilterError> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$")).map_err(|source| FilterError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
