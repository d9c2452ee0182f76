//! Storage layer for annotations.
//!
//! Provides persistence for annotations using `rusqlite`, and implements
//! [`IntervalSource`] so a [`Database`] can feed the query engine directly.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. Concurrent queries should
//! each open their own `Database`.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 format with millisecond precision
//! (e.g., `2024-01-15T10:30:00.000Z`). The fixed width keeps lexicographic
//! ordering equal to chronological ordering, so range filters run in SQL.

use std::path::Path;

use anq_core::{Annotation, AnnotationId, BoxError, IntervalSource, TimeWindow, ValidationError};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for annotation {annotation_id}: {timestamp}")]
    TimestampParse {
        annotation_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// An annotation failed validation on write or read.
    #[error("invalid annotation {annotation_id}")]
    InvalidAnnotation {
        annotation_id: String,
        #[source]
        source: ValidationError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

const SELECT_COLUMNS: &str = "id, start_date, end_date, owner, creation_user, host, category, url, message, source";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS annotations (
                id TEXT PRIMARY KEY,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                owner TEXT NOT NULL DEFAULT '',
                creation_user TEXT NOT NULL DEFAULT '',
                host TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL DEFAULT '',
                message TEXT NOT NULL DEFAULT '',
                source TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_annotations_start ON annotations(start_date);
            CREATE INDEX IF NOT EXISTS idx_annotations_end ON annotations(end_date);
            ",
        )?;
        Ok(())
    }

    /// Inserts a batch of annotations, ignoring duplicates by ID.
    ///
    /// The whole batch is rejected if any annotation ends before it starts.
    pub fn insert_annotations(&mut self, annotations: &[Annotation]) -> Result<usize, DbError> {
        if annotations.is_empty() {
            return Ok(0);
        }
        for annotation in annotations {
            annotation
                .validate()
                .map_err(|source| DbError::InvalidAnnotation {
                    annotation_id: annotation.id.to_string(),
                    source,
                })?;
        }

        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR IGNORE INTO annotations
                (id, start_date, end_date, owner, creation_user, host, category, url, message, source)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )?;
            for annotation in annotations {
                inserted += stmt.execute(params![
                    annotation.id.as_str(),
                    format_timestamp(annotation.start),
                    format_timestamp(annotation.end),
                    annotation.owner,
                    annotation.creation_user,
                    annotation.host,
                    annotation.category,
                    annotation.url,
                    annotation.message,
                    annotation.source,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(inserted, total = annotations.len(), "stored annotations");
        Ok(inserted)
    }

    /// Looks up a single annotation by ID.
    pub fn get_annotation(&self, id: &str) -> Result<Option<Annotation>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM annotations WHERE id = ?"
        ))?;
        let raw = stmt.query_row([id], RawAnnotation::from_row).optional()?;
        raw.map(RawAnnotation::into_annotation).transpose()
    }

    /// Lists all annotations, newest first (start descending, then ID descending).
    pub fn list_annotations(&self) -> Result<Vec<Annotation>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM annotations ORDER BY start_date DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], RawAnnotation::from_row)?;
        let mut annotations = Vec::new();
        for row in rows {
            annotations.push(row?.into_annotation()?);
        }
        Ok(annotations)
    }

    /// Lists annotations whose interval meets the window, newest first.
    ///
    /// Both boundaries are inclusive, so annotations touching the window at a
    /// single instant are returned too; callers re-check exact overlap.
    pub fn fetch_overlapping(&self, window: &TimeWindow) -> Result<Vec<Annotation>, DbError> {
        let start = format_timestamp(window.start);
        let end = format_timestamp(window.end);
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {SELECT_COLUMNS}
            FROM annotations
            WHERE start_date <= ? AND end_date >= ?
            ORDER BY start_date DESC, id DESC
            "
        ))?;
        let rows = stmt.query_map([end, start], RawAnnotation::from_row)?;
        let mut annotations = Vec::new();
        for row in rows {
            annotations.push(row?.into_annotation()?);
        }
        tracing::debug!(count = annotations.len(), "fetched overlapping annotations");
        Ok(annotations)
    }
}

impl IntervalSource for Database {
    fn fetch(&self, window: &TimeWindow) -> Result<Vec<Annotation>, BoxError> {
        Ok(self.fetch_overlapping(window)?)
    }
}

/// An annotation row before timestamp parsing.
struct RawAnnotation {
    id: String,
    start: String,
    end: String,
    owner: String,
    creation_user: String,
    host: String,
    category: String,
    url: String,
    message: String,
    source: String,
}

impl RawAnnotation {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start: row.get(1)?,
            end: row.get(2)?,
            owner: row.get(3)?,
            creation_user: row.get(4)?,
            host: row.get(5)?,
            category: row.get(6)?,
            url: row.get(7)?,
            message: row.get(8)?,
            source: row.get(9)?,
        })
    }

    fn into_annotation(self) -> Result<Annotation, DbError> {
        let start = parse_timestamp(&self.start, &self.id)?;
        let end = parse_timestamp(&self.end, &self.id)?;
        let id = AnnotationId::new(self.id.clone()).map_err(|source| DbError::InvalidAnnotation {
            annotation_id: self.id,
            source,
        })?;
        let annotation = Annotation {
            id,
            start,
            end,
            owner: self.owner,
            creation_user: self.creation_user,
            host: self.host,
            category: self.category,
            url: self.url,
            message: self.message,
            source: self.source,
        };
        annotation
            .validate()
            .map_err(|source| DbError::InvalidAnnotation {
                annotation_id: annotation.id.to_string(),
                source,
            })?;
        Ok(annotation)
    }
}

fn parse_timestamp(timestamp: &str, annotation_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            annotation_id: annotation_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
