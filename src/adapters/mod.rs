//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - DexScreener: HTTP pair feeds (cohort listing and keyword search)
//! - CLI: Command-line interface handlers

pub mod dexscreener;
pub mod cli;

pub use dexscreener::DexScreenerFeed;
pub use cli::CliApp;
