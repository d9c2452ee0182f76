//! CLI command implementations.

pub mod add;
pub mod import;
pub mod query;
