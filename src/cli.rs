//! CLI argument parsing for tickprof

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Report format for a persisted session
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated digest (default)
    Table,
    /// Call-graph exchange format for external viewers
    Callgrind,
    /// JSON document for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "tickprof")]
#[command(version)]
#[command(about = "Render reports from a persisted tick profiler session", long_about = None)]
pub struct Cli {
    /// Session state document written by the JSON file store
    #[arg(value_name = "STATE_FILE")]
    pub state: PathBuf,

    /// Report format
    #[arg(short = 'f', long = "format", value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Character budget for the table report (overrides the configuration)
    #[arg(short = 'l', long = "limit", value_name = "CHARS")]
    pub limit: Option<usize>,

    /// Cycle the report is rendered at (defaults to the end of the window)
    #[arg(long = "cycle", value_name = "N")]
    pub cycle: Option<u64>,

    /// Profiler configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
