//! Import command for loading annotations into the local `SQLite` store.
//!
//! Input is JSONL, one annotation per line:
//!
//! ```text
//! {"id":"a1","start":"2025-01-15T09:00:00Z","end":"2025-01-15T10:30:00Z","owner":"sre","message":"failover"}
//! ```
//!
//! Lines without an `id` get a UUID v5 derived from the line text, so
//! re-importing the same file stays idempotent.

use std::io::BufRead;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Deserialize;
use uuid::Uuid;

use anq_core::{Annotation, AnnotationId};
use anq_db::Database;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Default source to apply when incoming annotations omit `source`.
    #[arg(long)]
    pub source: Option<String>,
}

/// Reads annotations from `reader` and stores them, returning how many were new.
pub fn run<R: BufRead>(reader: R, db: &mut Database, args: &ImportArgs) -> Result<usize> {
    let annotations = parse_annotations(reader, args.source.as_deref())?;
    let inserted = db.insert_annotations(&annotations)?;
    Ok(inserted)
}

fn parse_annotations<R: BufRead>(reader: R, default_source: Option<&str>) -> Result<Vec<Annotation>> {
    let mut annotations = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed: ImportAnnotation = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        let annotation = parsed
            .into_annotation(trimmed, default_source)
            .with_context(|| format!("invalid annotation on line {}", idx + 1))?;
        annotations.push(annotation);
    }
    Ok(annotations)
}

#[derive(Debug, Deserialize)]
struct ImportAnnotation {
    #[serde(default)]
    id: Option<String>,
    start: DateTime<Utc>,
    #[serde(default)]
    end: Option<DateTime<Utc>>,
    #[serde(default)]
    owner: String,
    #[serde(default)]
    user: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    source: Option<String>,
}

impl ImportAnnotation {
    fn into_annotation(self, line: &str, default_source: Option<&str>) -> Result<Annotation> {
        let id = match self.id {
            Some(id) => AnnotationId::new(id)?,
            None => AnnotationId::new(line_id(line).to_string())?,
        };
        let source = match self.source {
            Some(source) if !source.trim().is_empty() => source,
            _ => default_source.unwrap_or_default().to_string(),
        };
        let annotation = Annotation {
            id,
            start: self.start,
            end: self.end.unwrap_or(self.start),
            owner: self.owner,
            creation_user: self.user,
            host: self.host,
            category: self.category,
            url: self.url,
            message: self.message,
            source,
        };
        annotation.validate()?;
        Ok(annotation)
    }
}

/// Stable ID for an id-less line.
fn line_id(line: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, line.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    #[test]
    fn parse_annotations_uses_default_source() {
        let input = r#"{"id":"1","start":"2025-01-01T00:00:00Z","end":"2025-01-01T01:00:00Z","owner":"sre"}"#;
        let annotations = parse_annotations(Cursor::new(input), Some("deployer")).unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].source, "deployer");
        assert_eq!(annotations[0].owner, "sre");
    }

    #[test]
    fn parse_annotations_keeps_explicit_source_and_skips_blank_lines() {
        let input = "\n{\"id\":\"1\",\"start\":\"2025-01-01T00:00:00Z\",\"source\":\"pager\"}\n\n";
        let annotations = parse_annotations(Cursor::new(input), Some("deployer")).unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].source, "pager");
        assert!(annotations[0].is_instant());
    }

    #[test]
    fn parse_annotations_derives_stable_missing_ids() {
        let input = "{\"start\":\"2025-01-01T00:00:00Z\"}\n{\"start\":\"2025-01-01T01:00:00Z\"}";
        let first = parse_annotations(Cursor::new(input), None).unwrap();
        let second = parse_annotations(Cursor::new(input), None).unwrap();
        let id = Uuid::parse_str(first[0].id.as_str()).unwrap();
        assert_eq!(id.get_version_num(), 5);
        assert_eq!(first[0].id, second[0].id);
        assert_ne!(first[0].id, first[1].id);
    }

    #[test]
    fn parse_annotations_rejects_inverted_interval() {
        let input = r#"{"id":"1","start":"2025-01-01T01:00:00Z","end":"2025-01-01T00:00:00Z"}"#;
        let err = parse_annotations(Cursor::new(input), None).unwrap_err();
        assert!(err.to_string().contains("invalid annotation on line 1"));
    }

    #[test]
    fn parse_annotations_reports_bad_json_line() {
        let input = "{\"id\":\"1\",\"start\":\"2025-01-01T00:00:00Z\"}\nnot json";
        let err = parse_annotations(Cursor::new(input), None).unwrap_err();
        assert!(err.to_string().contains("invalid JSON on line 2"));
    }

    #[test]
    fn run_inserts_into_database() {
        let mut db = Database::open_in_memory().unwrap();
        let input = r#"{"id":"1","start":"2025-01-01T00:00:00Z","end":"2025-01-01T01:00:00Z"}
{"id":"2","start":"2025-01-01T02:00:00Z","end":"2025-01-01T03:00:00Z"}"#;
        let args = ImportArgs { source: None };
        assert_eq!(run(Cursor::new(input), &mut db, &args).unwrap(), 2);
        assert_eq!(run(Cursor::new(input), &mut db, &args).unwrap(), 0);
    }

    #[test]
    fn reimporting_lines_without_ids_adds_nothing() {
        let mut db = Database::open_in_memory().unwrap();
        let input = r#"{"start":"2025-01-01T00:00:00Z","end":"2025-01-01T01:00:00Z","owner":"sre"}"#;
        let args = ImportArgs { source: None };
        assert_eq!(run(Cursor::new(input), &mut db, &args).unwrap(), 1);
        assert_eq!(run(Cursor::new(input), &mut db, &args).unwrap(), 0);
        assert_eq!(db.list_annotations().unwrap().len(), 1);
    }
}
