//! Command-line argument definitions for the Tessera CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Tessera serializer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the project manifest
    #[arg(help = "Path to the project manifest (TOML)")]
    pub input: String,

    /// Path to the output records file
    #[arg(short, long, default_value = "records.toml")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Exit with an error when the pass reports warnings
    #[arg(long)]
    pub deny_warnings: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
