//! Annotations: user-authored records describing an event over a time interval.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AnnotationId, ValidationError};

/// A stored annotation.
///
/// `end == start` denotes an instantaneous event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique identifier for this annotation.
    pub id: AnnotationId,
    /// When the annotated event started.
    pub start: DateTime<Utc>,
    /// When the annotated event ended.
    pub end: DateTime<Utc>,
    /// Team or person responsible for the event.
    #[serde(default)]
    pub owner: String,
    /// Who created the annotation.
    #[serde(default, rename = "user")]
    pub creation_user: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub message: String,
    /// System that recorded the annotation (e.g. "cli", "deployer").
    #[serde(default)]
    pub source: String,
}

impl Annotation {
    /// Creates an annotation with empty metadata.
    pub fn new(id: AnnotationId, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id,
            start,
            end,
            owner: String::new(),
            creation_user: String::new(),
            host: String::new(),
            category: String::new(),
            url: String::new(),
            message: String::new(),
            source: String::new(),
        }
    }

    /// Length of the annotated interval.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns true for an instantaneous event.
    pub fn is_instant(&self) -> bool {
        self.end == self.start
    }

    /// Checks that the annotation does not end before it starts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.end < self.start {
            return Err(ValidationError::EndBeforeStart {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Text fields a filter predicate may inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Owner,
    User,
    Host,
    Category,
    Url,
    Message,
    Source,
}

impl Field {
    /// All filterable fields, in display order.
    pub const ALL: [Self; 7] = [
        Self::Owner,
        Self::User,
        Self::Host,
        Self::Category,
        Self::Url,
        Self::Message,
        Self::Source,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::User => "user",
            Self::Host => "host",
            Self::Category => "category",
            Self::Url => "url",
            Self::Message => "message",
            Self::Source => "source",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Error type for unknown field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown annotation field: {}", self.0)
    }
}

impl std::error::Error for UnknownField {}

/// Field access used by filter predicates.
///
/// Predicates see annotations only through this trait, so test fixtures and
/// alternative record types can be filtered without conversion.
pub trait AnnotationFields {
    /// Identifier used in error reports.
    fn id(&self) -> &str;

    /// Returns the value of a text field.
    fn field(&self, field: Field) -> &str;
}

impl AnnotationFields for Annotation {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, field: Field) -> &str {
        match field {
            Field::Owner => &self.owner,
            Field::User => &self.creation_user,
            Field::Host => &self.host,
            Field::Category => &self.category,
            Field::Url => &self.url,
            Field::Message => &self.message,
            Field::Source => &self.source,
        }
    }
}
