//! CLI command implementations for sensors-exporter.
//!
//! This module provides implementations for all CLI subcommands:
//! - `config`: Configuration file generation
//! - `test`: Offline parsing of bridge output

pub mod config;
pub mod test;

// Re-export command functions
pub use config::command_config;
pub use test::command_test;
