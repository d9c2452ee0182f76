//! Annotation query CLI library.
//!
//! Supplies the concrete collaborators the query engine needs: a duration
//! parser, a filter language, and an `SQLite`-backed annotation store.

mod cli;
pub mod commands;
mod config;
pub mod duration;
pub mod filter;
pub mod util;

pub use cli::{Cli, Commands};
pub use config::Config;
