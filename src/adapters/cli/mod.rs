//! CLI Adapter
//!
//! Command-line interface for the Mayhem radar.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    format_age, format_usd_compact, render_summary, render_table, CliApp, Command, FetchCmd,
    MockCmd, OutputFormat, WatchCmd,
};

use anyhow::Result;

/// Initialize the CLI application
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    commands::execute(app).await
}
