//! Add command for recording a single annotation.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use clap::Args;
use uuid::Uuid;

use anq_core::{Annotation, AnnotationId};
use anq_db::Database;

use crate::util::parse_instant;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// When the event started: RFC 3339 or a duration ago (e.g., 2h).
    #[arg(long)]
    pub start: String,

    /// When the event ended. Defaults to the start (an instantaneous event).
    #[arg(long)]
    pub end: Option<String>,

    /// Annotation ID. A random UUID is used when omitted.
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long, default_value = "")]
    pub owner: String,

    /// Who is creating the annotation.
    #[arg(long, default_value = "")]
    pub user: String,

    /// Host the event concerns. Defaults to this machine's hostname.
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long, default_value = "")]
    pub category: String,

    #[arg(long, default_value = "")]
    pub url: String,

    #[arg(short, long, default_value = "")]
    pub message: String,

    /// System recording the annotation.
    #[arg(long, default_value = "cli")]
    pub source: String,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &AddArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let start = parse_instant(&args.start, now)?;
    let end = match &args.end {
        Some(end) => parse_instant(end, now)?,
        None => start,
    };

    let id = args
        .id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let mut annotation = Annotation::new(AnnotationId::new(id)?, start, end);
    annotation.owner.clone_from(&args.owner);
    annotation.creation_user.clone_from(&args.user);
    annotation.host = args.host.clone().unwrap_or_else(local_hostname);
    annotation.category.clone_from(&args.category);
    annotation.url.clone_from(&args.url);
    annotation.message.clone_from(&args.message);
    annotation.source.clone_from(&args.source);

    let inserted = db.insert_annotations(std::slice::from_ref(&annotation))?;
    if inserted == 0 {
        bail!("annotation already exists: {}", annotation.id);
    }
    tracing::debug!(id = %annotation.id, "annotation added");
    writeln!(writer, "Added annotation {}", annotation.id)?;
    Ok(())
}

fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_default()
}
