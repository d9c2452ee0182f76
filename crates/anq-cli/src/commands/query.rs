//! Query commands: `count`, `weighted-count`, `durations` and `table`.
//!
//! Text output is tab separated: a bare number for counts, `index<TAB>value`
//! lines for series, and a header line followed by rows for tables. Series
//! indexes identify rows within one response; they are not timestamps.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use anq_core::{AggregationResult, IntervalSource, QueryEngine};

use crate::duration::OpenTsdbDuration;
use crate::filter::GlobFilterCompiler;

/// Arguments shared by every query.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Filter expression, e.g. "owner:sre AND host:db*".
    #[arg(short, long, default_value = "")]
    pub filter: String,

    /// How long before now the window starts (e.g., 1h, 7d).
    pub start: String,

    /// How long before now the window ends. Defaults to now.
    #[arg(default_value = "")]
    pub end: String,

    /// Output JSON instead of tab-separated text.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `table`.
#[derive(Debug, Args)]
pub struct TableArgs {
    /// Comma-separated columns: start, end, owner, user, host, category, url,
    /// message, duration.
    #[arg(long)]
    pub columns: String,

    #[command(flatten)]
    pub query: QueryArgs,
}

/// Which aggregate to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Count,
    WeightedCount,
    Durations,
}

/// Runs an aggregate query against `source` and writes the result.
pub fn run<W: Write, S: IntervalSource + ?Sized>(
    writer: &mut W,
    source: &S,
    query: Query,
    args: &QueryArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let engine = QueryEngine::new(source, &OpenTsdbDuration, &GlobFilterCompiler, now);
    let result = match query {
        Query::Count => engine.count(&args.filter, &args.start, &args.end)?,
        Query::WeightedCount => engine.weighted_count(&args.filter, &args.start, &args.end)?,
        Query::Durations => engine.total_duration(&args.filter, &args.start, &args.end)?,
    };
    render(writer, &result, args.json)
}

/// Runs a table query against `source` and writes the result.
pub fn run_table<W: Write, S: IntervalSource + ?Sized>(
    writer: &mut W,
    source: &S,
    args: &TableArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let engine = QueryEngine::new(source, &OpenTsdbDuration, &GlobFilterCompiler, now);
    let query = &args.query;
    let result = engine.table(&query.filter, &args.columns, &query.start, &query.end)?;
    render(writer, &result, query.json)
}

/// Writes a result as JSON or tab-separated text.
pub fn render<W: Write>(writer: &mut W, result: &AggregationResult, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *writer, result)?;
        writeln!(writer)?;
        return Ok(());
    }

    match result {
        AggregationResult::Scalar(value) => writeln!(writer, "{value}")?,
        AggregationResult::Series(series) => {
            for (index, value) in series.iter() {
                writeln!(writer, "{index}\t{value}")?;
            }
        }
        AggregationResult::Table(table) => {
            writeln!(writer, "{}", table.columns.join("\t"))?;
            for row in &table.rows {
                let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
                writeln!(writer, "{}", cells.join("\t"))?;
            }
        }
    }
    Ok(())
}
