//! CLI administration tool for nano-link.
//!
//! Provides commands for viewing statistics, running a one-off retention
//! sweep, and performing database checks without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Most recent links
//! cargo run --bin admin -- recent --limit 20
//!
//! # Delete links older than 7 days
//! cargo run --bin admin -- sweep --max-age-days 7
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Reads the same variables as the server (see [`nano_link::config`]); only
//! `DATABASE_URL`, the pool settings, and `BASE_URL` matter here.

use nano_link::config::{self, Config};
use nano_link::domain::repositories::LinkStore;
use nano_link::infrastructure::persistence::SqliteLinkStore;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// CLI tool for managing nano-link.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Show aggregate statistics
    Stats,

    /// List the most recently created links
    Recent {
        /// Number of links to show
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },

    /// Delete links older than the retention age
    Sweep {
        /// Maximum age in days (defaults to MAX_URL_AGE_SECS)
        #[arg(short, long)]
        max_age_days: Option<u64>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Store warnings go to stderr so they don't mix with command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;

    let store = SqliteLinkStore::connect(&config.store_options())
        .await
        .context("Failed to open database")?;

    let result = match cli.command {
        Commands::Stats => handle_stats(&store).await,
        Commands::Recent { limit } => handle_recent(&store, &config, limit).await,
        Commands::Sweep { max_age_days, yes } => {
            handle_sweep(&store, &config, max_age_days, yes).await
        }
        Commands::Db { action } => handle_db_action(action, &store).await,
    };

    store.close().await;

    result
}

/// Displays aggregate statistics.
async fn handle_stats(store: &SqliteLinkStore) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let stats = store
        .stats()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load stats: {}", e))?;

    println!(
        "  Links:        {}",
        stats.total_urls.to_string().bright_green().bold()
    );
    println!(
        "  Visits:       {}",
        stats.total_visits.to_string().bright_green().bold()
    );
    match stats.last_created {
        Some(at) => println!(
            "  Last created: {}",
            at.format("%Y-%m-%d %H:%M").to_string().bright_white()
        ),
        None => println!("  Last created: {}", "never".bright_black()),
    }
    println!();

    Ok(())
}

/// Lists the most recent links.
///
/// # Output Format
///
/// ```text
/// 🔗 Recent Links
///
///   Code         Visits   Created            URL
///   ──────────────────────────────────────────────────────────────────────
///   abc123       12       2026-01-15 10:30   https://example.com/page
/// ```
async fn handle_recent(store: &SqliteLinkStore, config: &Config, limit: i64) -> Result<()> {
    println!("{}", "🔗 Recent Links".bright_blue().bold());
    println!();

    let links = store
        .list_recent(limit.max(1))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<12} {:<8} {:<18} {}",
        "Code".bright_white().bold(),
        "Visits".bright_white().bold(),
        "Created".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &links {
        println!(
            "  {:<12} {:<8} {:<18} {}",
            link.code.cyan(),
            link.visits.to_string().bright_green(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.original_url
        );
    }

    println!();
    println!(
        "  Short URLs are served under {}",
        config.base_url.bright_white()
    );
    println!();

    Ok(())
}

/// Runs a single retention sweep after confirmation.
async fn handle_sweep(
    store: &SqliteLinkStore,
    config: &Config,
    max_age_days: Option<u64>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🧹 Retention Sweep".bright_blue().bold());
    println!();

    let max_age = max_age_from_days(max_age_days, config.max_url_age_secs)?;

    println!(
        "  Deleting links older than {} days",
        (max_age.as_secs() / SECONDS_PER_DAY)
            .to_string()
            .bright_yellow()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete these links?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = run_sweep(
        store,
        max_age,
        Duration::from_secs(config.sweep_timeout_secs),
    )
    .await?;

    println!(
        "{} {}",
        "✅ Deleted links:".green().bold(),
        deleted.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Deletes links older than `max_age`, reporting the store error on failure.
async fn run_sweep(
    store: &SqliteLinkStore,
    max_age: Duration,
    run_timeout: Duration,
) -> Result<u64> {
    tokio::time::timeout(run_timeout, store.delete_older_than(max_age))
        .await
        .map_err(|_| anyhow::anyhow!("Sweep timed out after {}s", run_timeout.as_secs()))?
        .map_err(|e| anyhow::anyhow!("Sweep failed: {}", e))
}

/// Resolves `--max-age-days`, falling back to the configured retention age.
fn max_age_from_days(max_age_days: Option<u64>, default_secs: u64) -> Result<Duration> {
    match max_age_days {
        Some(0) => anyhow::bail!("--max-age-days must be at least 1"),
        Some(days) => days
            .checked_mul(SECONDS_PER_DAY)
            .map(Duration::from_secs)
            .context("--max-age-days is too large"),
        None => Ok(Duration::from_secs(default_secs)),
    }
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, store: &SqliteLinkStore) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            store
                .ping()
                .await
                .map_err(|e| anyhow::anyhow!("Database check failed: {}", e))?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version = store
                .sqlite_version()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read version: {}", e))?;
            let stats = store
                .stats()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to load stats: {}", e))?;

            println!("  SQLite: {}", version.bright_white());
            println!("  Rows:   {}", stats.total_urls.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
