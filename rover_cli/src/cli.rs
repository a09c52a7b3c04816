//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "rover", version, about = "Rover sensing and calibration CLI (simulated drive)")]
pub struct Cli {
    /// Path to config TOML; built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit results and logs as JSON instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the motor speed calibration and print the measured bounds
    Calibrate,
    /// Calibrate, then drive with fixed setpoints and print telemetry
    Drive {
        /// Left motor setpoint
        #[arg(long, allow_negative_numbers = true)]
        left: i16,
        /// Right motor setpoint
        #[arg(long, allow_negative_numbers = true)]
        right: i16,
        /// How long to drive in ms
        #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
        duration_ms: u64,
        /// Telemetry interval in ms
        #[arg(long, value_name = "MS", default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
        every_ms: u64,
    },
    /// Quick health check (simulated robot builds and ticks)
    SelfCheck,
}
