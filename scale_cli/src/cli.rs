//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Replay a captured instrument stream from this file instead of opening a port.
pub const TEST_STREAM_ENV: &str = "SCALE_TEST_STREAM";

#[derive(Parser, Debug)]
#[command(name = "scale", version, about = "Weighing station telemetry")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/scale.toml")]
    pub config: PathBuf,

    /// Print readings and errors as JSON, log as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); falls back to logging.level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the current weight once
    Read,
    /// Print readings as they arrive until Ctrl-C
    Monitor {
        /// Stop after this many readings
        #[arg(long, value_name = "N")]
        count: Option<u64>,
        /// Pause between fetches; readings arriving meanwhile are dropped at the relay
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,
    },
    /// List serial adapters and mark the configured device
    Ports,
    /// Quick health check (config, port selection or synthetic ok)
    SelfCheck,
}
