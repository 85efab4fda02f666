//! CLI arguments and subcommands for sensors-exporter.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing and the `log_level` config key
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "sensors-exporter",
    about = "Prometheus exporter for temperature and humidity readings from a sensor bridge",
    long_about = "Prometheus exporter for temperature and humidity readings from a sensor bridge.\n\n\
                  Keeps a TCP connection to a line-oriented sensor bridge, reconnecting with a \
                  fixed backoff, and exports the latest value per sensor on /metrics.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Sensor bridge to read samples from (host:port)
    #[arg(long)]
    pub connect: Option<String>,

    /// Connection deadline in seconds
    #[arg(long)]
    pub connect_timeout: Option<u64>,

    /// Delay between reconnect attempts in seconds
    #[arg(long)]
    pub backoff: Option<u64>,

    /// Longest accepted line from the bridge, in bytes
    #[arg(long)]
    pub max_line_bytes: Option<usize>,

    /// Log level (overrides `log_level` from the config file; default: info)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,

    /// Enable TLS/SSL for HTTPS
    #[arg(long)]
    pub enable_tls: bool,

    /// Path to TLS certificate file (PEM format)
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Path to TLS private key file (PEM format)
    #[arg(long)]
    pub tls_key: Option<PathBuf>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Feed sample lines from a file or stdin through the parser and print the resulting metrics
    Test {
        /// Input file with one bridge line per line (stdin if omitted)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Show how every line was classified
        #[arg(long)]
        verbose: bool,
    },
}
