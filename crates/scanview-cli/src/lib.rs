//! scanview - Live terminal display for image scan pipelines
//!
//! Pipeline stages publish events on a [`scanview_bus`] channel; the
//! [`ui::Display`] drains them on a single task and draws an append-only
//! frame of spinner lines, messages and reports on stderr.
//!
//! # Architecture
//!
//! - **Single consumer**: only the display loop appends lines; spinner
//!   tasks may only overwrite the line they were given.
//! - **Completion barrier**: summaries wait for every spinner registered
//!   before them, so results never appear above a still-moving spinner.
//! - **Exit code from events**: the last error event decides the exit
//!   code; display failures fall back to a reserved code.

#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod demo;
pub mod report;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use config::{ResultsTarget, UiConfig};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "scanview")]
#[command(author, version, about = "scanview - live terminal display for image scans")]
pub struct Cli {
    /// Path to a ui.toml settings file
    #[arg(long, global = true, env = "SCANVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output. Any non-empty `NO_COLOR` other than a
    /// falsey word ("0", "false", "no", "off") counts.
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Stream that receives full reports
    #[arg(long, global = true, value_enum)]
    pub results: Option<ResultsTarget>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a simulated fetch/catalog/scan pipeline through the display
    Demo {
        /// Image reference to "scan"
        #[arg(long, default_value = "alpine:3.19")]
        image: String,
        /// Number of layers to pull
        #[arg(long, default_value_t = 4)]
        layers: u64,
        /// Milliseconds per unit of simulated work
        #[arg(long, default_value_t = 250)]
        step_ms: u64,
        /// Fail the scan with this exit code
        #[arg(long, value_parser = clap::value_parser!(i32).range(1..=255))]
        fail_with: Option<i32>,
        /// Finish with a policy violation report
        #[arg(long)]
        violations: bool,
        /// Announce a newer release first
        #[arg(long)]
        new_version: Option<String>,
    },
}
