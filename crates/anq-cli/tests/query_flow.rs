//! End-to-end tests for the `anq` binary: import → query.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const NOW: &str = "2025-01-15T12:00:00Z";

const ANNOTATIONS: &str = r#"{"id":"left","start":"2025-01-15T09:00:00Z","end":"2025-01-15T10:30:00Z","owner":"sre","host":"db01","message":"replica lag"}
{"id":"inside","start":"2025-01-15T10:10:00Z","end":"2025-01-15T10:40:00Z","owner":"dba","host":"db02","message":"vacuum"}
{"id":"right","start":"2025-01-15T10:45:00Z","end":"2025-01-15T12:00:00Z","owner":"sre","host":"db01","message":"failover"}
{"id":"stale","start":"2025-01-14T09:00:00Z","end":"2025-01-14T10:00:00Z","owner":"sre","host":"db01","message":"old"}
"#;

/// Writes a config pointing at a fresh database inside `temp`.
fn write_config(temp: &Path) -> std::path::PathBuf {
    let db_path = temp.join("data").join("anq.db");
    let config_path = temp.join("config.toml");
    let mut file = std::fs::File::create(&config_path).unwrap();
    writeln!(file, r#"database_path = "{}""#, db_path.display()).unwrap();
    config_path
}

fn anq(temp: &Path, config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_anq"))
        .env("HOME", temp)
        .env_remove("ANQ_DATABASE_PATH")
        .arg("--config")
        .arg(config)
        .arg("--now")
        .arg(NOW)
        .args(args)
        .output()
        .expect("failed to run anq")
}

fn import(temp: &Path, config: &Path, input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_anq"))
        .env("HOME", temp)
        .env_remove("ANQ_DATABASE_PATH")
        .arg("--config")
        .arg(config)
        .arg("import")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn anq import");
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "anq failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn seeded() -> (TempDir, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    let output = import(temp.path(), &config, ANNOTATIONS);
    assert_eq!(stdout(&output), "Imported 4 annotations\n");
    (temp, config)
}

#[test]
fn test_import_is_idempotent() {
    let (temp, config) = seeded();
    let output = import(temp.path(), &config, ANNOTATIONS);
    assert_eq!(stdout(&output), "Imported 0 annotations\n");
}

#[test]
fn test_count_over_window() {
    let (temp, config) = seeded();
    assert_eq!(stdout(&anq(temp.path(), &config, &["count", "2h", "1h"])), "3\n");
    assert_eq!(
        stdout(&anq(temp.path(), &config, &["count", "-f", "owner:sre", "2h", "1h"])),
        "2\n"
    );
}

#[test]
fn test_durations_alias_reports_seconds_newest_first() {
    let (temp, config) = seeded();
    let output = anq(temp.path(), &config, &["andurations", "2h", "1h"]);
    assert_eq!(stdout(&output), "0\t900\n1\t1800\n2\t1800\n");
}

#[test]
fn test_weighted_count_json() {
    let (temp, config) = seeded();
    let output = anq(
        temp.path(),
        &config,
        &["weighted-count", "--json", "-f", "host:db02", "2h", "1h"],
    );
    assert_eq!(stdout(&output), "{\"type\":\"series\",\"value\":{\"0\":1.0}}\n");
}

#[test]
fn test_table_lists_selected_columns() {
    let (temp, config) = seeded();
    let output = anq(
        temp.path(),
        &config,
        &["table", "--columns", "owner,duration,message", "2h", "1h"],
    );
    assert_eq!(
        stdout(&output),
        "owner\tduration\tmessage\n\
         sre\t001:15:00\tfailover\n\
         dba\t000:30:00\tvacuum\n\
         sre\t001:30:00\treplica lag\n"
    );
}

#[test]
fn test_table_unknown_column_fails() {
    let (temp, config) = seeded();
    let output = anq(temp.path(), &config, &["table", "--columns", "owner,team", "2h"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("team"), "expected column name in: {stderr}");
}

#[test]
fn test_add_then_count() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    let added = anq(
        temp.path(),
        &config,
        &["add", "--id", "deploy-1", "--start", "30m", "--host", "web01", "-m", "deploy"],
    );
    assert_eq!(stdout(&added), "Added annotation deploy-1\n");

    let output = anq(temp.path(), &config, &["count", "-f", "host:web*", "1h"]);
    assert_eq!(stdout(&output), "1\n");
}
