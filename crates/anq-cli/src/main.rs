use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use anq_cli::commands::{add, import, query};
use anq_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<anq_db::Database> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    anq_db::Database::open(&config.database_path).context("failed to open database")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so query output on stdout stays parseable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let now = cli.now.unwrap_or_else(Utc::now);
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Count(args)) => {
            let db = open_database(cli.config.as_deref())?;
            query::run(&mut stdout, &db, query::Query::Count, args, now)?;
        }
        Some(Commands::WeightedCount(args)) => {
            let db = open_database(cli.config.as_deref())?;
            query::run(&mut stdout, &db, query::Query::WeightedCount, args, now)?;
        }
        Some(Commands::Durations(args)) => {
            let db = open_database(cli.config.as_deref())?;
            query::run(&mut stdout, &db, query::Query::Durations, args, now)?;
        }
        Some(Commands::Table(args)) => {
            let db = open_database(cli.config.as_deref())?;
            query::run_table(&mut stdout, &db, args, now)?;
        }
        Some(Commands::Add(args)) => {
            let mut db = open_database(cli.config.as_deref())?;
            add::run(&mut stdout, &mut db, args, now)?;
        }
        Some(Commands::Import(args)) => {
            let mut db = open_database(cli.config.as_deref())?;
            let inserted = import::run(std::io::stdin().lock(), &mut db, args)?;
            tracing::info!(inserted, "import complete");
            writeln!(stdout, "Imported {inserted} annotations")?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
