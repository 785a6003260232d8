//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the Mayhem radar.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};

use crate::application::{RadarSnapshot, TokenAggregator, TokenPoller};
use crate::config::{load_config_or_default, RadarConfig};
use crate::domain::{
    generate_mock_tokens, sort_by_created_desc, CanonicalToken, Timeframe, TokenFilter,
    DEFAULT_MOCK_COUNT,
};

/// Mayhem Radar - pump.fun Mayhem Mode token feed
#[derive(Parser, Debug)]
#[command(
    name = "mayhem-radar",
    version = env!("CARGO_PKG_VERSION"),
    about = "Live radar of pump.fun Mayhem Mode tokens from DexScreener",
    long_about = "Mayhem Radar pulls Solana pump.fun pairs from DexScreener, keeps the Mayhem \
                  Mode cohort, ranks it by volume and normalizes every pair into one token \
                  record. When DexScreener is unreachable it serves a simulated batch."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch one batch and print it
    Fetch(FetchCmd),

    /// Poll continuously and print a summary each cycle
    Watch(WatchCmd),

    /// Print a simulated batch without touching the network
    Mock(MockCmd),
}

/// Output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Fetch one batch
#[derive(Parser, Debug)]
pub struct FetchCmd {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Only tokens created within this window (1h, 6h, 24h)
    #[arg(short, long, value_name = "WINDOW", default_value = "1h")]
    pub timeframe: Timeframe,

    /// Minimum volume in SOL
    #[arg(long, value_name = "SOL", default_value = "0")]
    pub min_volume: f64,

    /// Minimum AI score
    #[arg(long, value_name = "SCORE", default_value = "60")]
    pub min_score: u8,

    /// Case-insensitive name or symbol search
    #[arg(short, long, value_name = "TERM")]
    pub search: Option<String>,

    /// Maximum rows to print
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,
}

impl FetchCmd {
    pub fn filter(&self) -> TokenFilter {
        TokenFilter::default()
            .with_timeframe(self.timeframe)
            .with_min_volume(self.min_volume)
            .with_min_score(self.min_score)
            .with_search(self.search.clone().unwrap_or_default())
    }
}

/// Poll continuously
#[derive(Parser, Debug)]
pub struct WatchCmd {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Override poll interval in seconds
    #[arg(short, long, value_name = "SECS")]
    pub interval: Option<u64>,
}

/// Print a simulated batch
#[derive(Parser, Debug)]
pub struct MockCmd {
    /// Number of tokens to generate
    #[arg(short = 'n', long, value_name = "N", default_value_t = DEFAULT_MOCK_COUNT)]
    pub count: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    match app.command {
        Command::Fetch(cmd) => {
            let config = load(cmd.config.as_deref())?;
            init_logging(app.verbose, app.debug, &config.logging.level)?;
            fetch_command(cmd, config).await
        }
        Command::Watch(cmd) => {
            let config = load(cmd.config.as_deref())?;
            init_logging(app.verbose, app.debug, &config.logging.level)?;
            watch_command(cmd, config).await
        }
        Command::Mock(cmd) => {
            init_logging(app.verbose, app.debug, &RadarConfig::default().logging.level)?;
            mock_command(cmd)
        }
    }
}

fn load(path: Option<&str>) -> Result<RadarConfig> {
    load_config_or_default(path)
        .with_context(|| format!("Failed to load configuration from {}", path.unwrap_or("defaults")))
}

/// Initialize logging system
fn init_logging(verbose: bool, debug: bool, configured_level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        configured_level
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Handle fetch command
async fn fetch_command(cmd: FetchCmd, config: RadarConfig) -> Result<()> {
    let aggregator =
        TokenAggregator::from_config(&config).context("Failed to build DexScreener feeds")?;

    let batch = aggregator.fetch_tokens().await;
    let (source, cohort_filtered) = (batch.source, batch.cohort_filtered);
    let unfiltered_live = batch.is_live() && !cohort_filtered;
    let mut tokens = batch.tokens;
    sort_by_created_desc(&mut tokens);

    let now = Utc::now();
    let mut visible: Vec<&CanonicalToken> = cmd.filter().apply(&tokens, now);
    if let Some(limit) = cmd.limit {
        visible.truncate(limit);
    }

    match cmd.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "source": source,
                    "cohortFiltered": cohort_filtered,
                    "total": tokens.len(),
                    "tokens": visible,
                }))?
            );
        }
        OutputFormat::Text => {
            println!(
                "Source: {} | {} of {} tokens shown{}",
                source,
                visible.len(),
                tokens.len(),
                if unfiltered_live {
                    " | no Mayhem match, showing all pump.fun pairs"
                } else {
                    ""
                }
            );
            print!("{}", render_table(&visible, now));
        }
    }

    Ok(())
}

/// Handle watch command
async fn watch_command(cmd: WatchCmd, config: RadarConfig) -> Result<()> {
    let interval = Duration::from_secs(cmd.interval.unwrap_or(config.poller.interval_secs).max(1));
    let aggregator =
        TokenAggregator::from_config(&config).context("Failed to build DexScreener feeds")?;
    let poller = TokenPoller::new(Arc::new(aggregator)).with_poll_interval(interval);

    let handle = poller.spawn().await;

    // Setup Ctrl+C handler
    let stopper = poller.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        stopper.stop().await;
    });

    println!("Watching Mayhem feed every {}s (Ctrl+C to stop)", interval.as_secs());

    let mut last_seen = None;
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    while !handle.is_finished() {
        ticker.tick().await;
        let snapshot = poller.snapshot().await;
        if snapshot.last_updated.is_some() && snapshot.last_updated != last_seen {
            last_seen = snapshot.last_updated;
            println!("{}", render_summary(&snapshot));
        }
    }

    handle.await.context("Poller task failed")?;
    Ok(())
}

/// Handle mock command
fn mock_command(cmd: MockCmd) -> Result<()> {
    let mut tokens = generate_mock_tokens(cmd.count);
    sort_by_created_desc(&mut tokens);

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tokens)?),
        OutputFormat::Text => {
            let rows: Vec<&CanonicalToken> = tokens.iter().collect();
            print!("{}", render_table(&rows, Utc::now()));
        }
    }
    Ok(())
}

/// One line per poll cycle
pub fn render_summary(snapshot: &RadarSnapshot) -> String {
    let updated = snapshot
        .last_updated
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());

    let top = snapshot
        .tokens
        .iter()
        .max_by(|a, b| a.volume.total_cmp(&b.volume))
        .map(|t| format!(" | top volume {} ({:.1} SOL)", t.symbol, t.volume))
        .unwrap_or_default();

    let mut line = format!(
        "[{}] {} tokens from {} feed{}",
        updated,
        snapshot.tokens.len(),
        snapshot.source,
        top
    );
    if let Some(notice) = &snapshot.notice {
        line.push_str(" | ");
        line.push_str(notice);
    }
    line
}

/// Fixed-width token table
pub fn render_table(tokens: &[&CanonicalToken], now: DateTime<Utc>) -> String {
    let mut out = format!(
        "{:<8} {:<10} {:<24} {:>10} {:>10} {:>10} {:>8} {:>4}\n",
        "AGE", "SYMBOL", "NAME", "MCAP", "VOL SOL", "LIQ SOL", "HOLDERS", "AI"
    );
    for token in tokens {
        out.push_str(&format!(
            "{:<8} {:<10} {:<24} {:>10} {:>10.2} {:>10.2} {:>8} {:>4}\n",
            format_age(token.age_minutes(now)),
            truncate(&token.symbol, 10),
            truncate(&token.name, 24),
            format_usd_compact(token.market_cap),
            token.volume,
            token.liquidity,
            token.holders,
            token.ai_score
        ));
    }
    out
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

/// Minutes as `42m` or `3h05m`
pub fn format_age(minutes: i64) -> String {
    let minutes = minutes.max(0);
    if minutes < 60 {
        format!("{}m", minutes)
    } else {
        format!("{}h{:02}m", minutes / 60, minutes % 60)
    }
}

/// `$950`, `$12.3K`, `$4.56M`
pub fn format_usd_compact(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.1}K", value / 1_000.0)
    } else {
        format!("${:.0}", value)
    }
}
