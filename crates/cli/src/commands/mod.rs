//! CLI subcommand implementations.

pub mod admin;
pub mod db;
pub mod migrate;
pub mod smoke;
