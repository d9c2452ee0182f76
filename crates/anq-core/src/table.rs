//! Tabular projection of annotation fields.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;

use crate::annotation::Annotation;
use crate::error::QueryError;

/// A projectable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Start,
    End,
    Owner,
    User,
    Host,
    Category,
    Url,
    Message,
    Duration,
}

impl Column {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Owner => "owner",
            Self::User => "user",
            Self::Host => "host",
            Self::Category => "category",
            Self::Url => "url",
            Self::Message => "message",
            Self::Duration => "duration",
        }
    }

    fn value(self, annotation: &Annotation) -> Value {
        match self {
            Self::Start => Value::Time(annotation.start),
            Self::End => Value::Time(annotation.end),
            Self::Owner => Value::Text(annotation.owner.clone()),
            Self::User => Value::Text(annotation.creation_user.clone()),
            Self::Host => Value::Text(annotation.host.clone()),
            Self::Category => Value::Text(annotation.category.clone()),
            Self::Url => Value::Text(annotation.url.clone()),
            Self::Message => Value::Text(annotation.message.clone()),
            Self::Duration => Value::Text(hhmmss(annotation.duration())),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            "owner" => Ok(Self::Owner),
            "user" => Ok(Self::User),
            "host" => Ok(Self::Host),
            "category" => Ok(Self::Category),
            "url" => Ok(Self::Url),
            "message" => Ok(Self::Message),
            "duration" => Ok(Self::Duration),
            _ => Err(QueryError::UnknownColumn(s.to_string())),
        }
    }
}

/// Parses a comma-separated column list.
///
/// Names are trimmed; repeats and any order are allowed. Fails on the first
/// unknown name.
pub fn parse_columns(csv: &str) -> Result<Vec<Column>, QueryError> {
    if csv.trim().is_empty() {
        return Err(QueryError::EmptyColumnList);
    }
    csv.split(',').map(|name| name.trim().parse()).collect()
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Time(DateTime<Utc>),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time(time) => f.write_str(&time.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Rows of projected values under named columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Projects each annotation onto the requested columns, in request order.
pub fn project(annotations: &[Annotation], columns: &[Column]) -> Table {
    let rows = annotations
        .iter()
        .map(|annotation| columns.iter().map(|c| c.value(annotation)).collect())
        .collect();
    Table {
        columns: columns.iter().map(|c| c.as_str().to_string()).collect(),
        rows,
    }
}

/// Formats a duration as zero-padded `HHH:MM:SS`.
///
/// Lexical order of the output matches numeric order up to 999 hours; longer
/// durations widen the hour field. Sub-second parts are truncated and
/// negative durations render as zero.
pub fn hhmmss(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:03}:{minutes:02}:{seconds:02}")
}
