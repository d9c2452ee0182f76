//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use crate::commands::add::AddArgs;
use crate::commands::import::ImportArgs;
use crate::commands::query::{QueryArgs, TableArgs};
use crate::util::parse_rfc3339;

/// Annotation overlap queries.
///
/// Counts, weighs and tabulates annotated time intervals that overlap a
/// window ending relative to now.
#[derive(Debug, Parser)]
#[command(name = "anq", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Reference time that window offsets count back from. Defaults to now.
    #[arg(long, global = true, value_parser = parse_rfc3339)]
    pub now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Count annotations overlapping the window.
    Count(QueryArgs),

    /// Per-annotation fraction of each interval inside the window.
    #[command(alias = "ancounts")]
    WeightedCount(QueryArgs),

    /// Per-annotation seconds spent inside the window.
    #[command(alias = "andurations")]
    Durations(QueryArgs),

    /// Tabulate selected fields of overlapping annotations, newest first.
    #[command(alias = "antable")]
    Table(TableArgs),

    /// Record a single annotation.
    Add(AddArgs),

    /// Import annotations from stdin (JSONL format).
    Import(ImportArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn aliases_map_to_commands() {
        let cli = Cli::try_parse_from(["anq", "ancounts", "1h"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::WeightedCount(_))));

        let cli = Cli::try_parse_from(["anq", "andurations", "1h", "30m"]).unwrap();
        match cli.command {
            Some(Commands::Durations(args)) => {
                assert_eq!(args.start, "1h");
                assert_eq!(args.end, "30m");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["anq", "antable", "--columns", "start", "1h"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Table(_))));
    }

    #[test]
    fn end_defaults_to_blank() {
        let cli = Cli::try_parse_from(["anq", "count", "-f", "owner:sre", "1d"]).unwrap();
        match cli.command {
            Some(Commands::Count(args)) => {
                assert_eq!(args.filter, "owner:sre");
                assert_eq!(args.end, "");
                assert!(!args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn now_must_be_rfc3339() {
        let cli =
            Cli::try_parse_from(["anq", "--now", "2025-01-15T12:00:00Z", "count", "1h"]).unwrap();
        assert_eq!(
            cli.now.map(|now| now.to_rfc3339()),
            Some("2025-01-15T12:00:00+00:00".to_string())
        );
        assert!(Cli::try_parse_from(["anq", "--now", "noon", "count", "1h"]).is_err());
    }
}
