//! Mayhem Radar - pump.fun Mayhem Mode token feed
//!
//! Command-line entry point. See `mayhem-radar --help`.

use anyhow::Result;

use mayhem_radar::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (endpoint overrides go here)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
