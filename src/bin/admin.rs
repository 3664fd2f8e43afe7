//! CLI administration tool for weather-relay.
//!
//! Runs lookups and inspects the fetch log without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Fetch current weather (uses the same cache and provider chain as the server)
//! cargo run --bin admin -- fetch Berlin
//!
//! # Show the newest stored record for a source and key
//! cargo run --bin admin -- latest openweather Berlin
//!
//! # Show record counts per source
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server. `stats` and `db` commands require `DATABASE_URL`;
//! without it `fetch` and `latest` work against a throwaway in-memory store.

use weather_relay::config::{self, Config};
use weather_relay::prelude::{ExternalData, LookupOrigin, Source};
use weather_relay::server::build_state;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;

/// CLI tool for managing weather-relay.
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
    /// Look up current weather for a city
    Fetch {
        /// City name (e.g., "Berlin", "New York")
        city: String,
    },

    /// Show the newest stored record
    Latest {
        /// Source identifier: openweather, open-meteo, or mock-openweather
        #[arg(value_parser = parse_source)]
        source: Source,
        /// Lookup key (city name as requested)
        key: String,
    },

    /// Show record counts per source
    Stats,

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

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    match cli.command {
        Commands::Fetch { city } => fetch(&config, &city).await?,
        Commands::Latest { source, key } => latest(&config, source, &key).await?,
        Commands::Stats => handle_stats(&connect(&config).await?).await?,
        Commands::Db { action } => handle_db_action(action, &connect(&config).await?).await?,
    }

    Ok(())
}

fn parse_source(value: &str) -> Result<Source, String> {
    Source::parse(value).ok_or_else(|| {
        let known: Vec<&str> = Source::ALL.iter().map(|s| s.as_str()).collect();
        format!("unknown source '{}', expected one of: {}", value, known.join(", "))
    })
}

async fn connect(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set")?;

    PgPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Runs one lookup through the fetch service and prints the report.
async fn fetch(config: &Config, city: &str) -> Result<()> {
    println!("{} {}", "🌍 Fetching weather for".bright_blue().bold(), city.cyan());
    println!();

    let state = build_state(config).await?;
    let lookup = state
        .weather_service
        .fetch_weather(city)
        .await
        .map_err(|e| anyhow::anyhow!("Lookup failed: {}", e))?;

    let origin = match lookup.origin {
        LookupOrigin::Cache => "cache".green(),
        LookupOrigin::Provider(source) => source.as_str().bright_green(),
        LookupOrigin::Placeholder => "placeholder (all providers failed)".yellow(),
    };

    let report = &lookup.report;
    println!("  Location:    {}", report.name.bright_white().bold());
    match report.temperature_celsius {
        Some(t) => println!("  Temperature: {}", format!("{:.1}°C", t).bright_yellow()),
        None => println!("  Temperature: {}", "n/a".dimmed()),
    }
    println!("  Conditions:  {} {}", report.icon, report.description);
    println!("  Served from: {}", origin);
    println!();

    Ok(())
}

/// Prints the newest stored record for `(source, key)`.
///
/// Fails (non-zero exit) when nothing is stored or the store is unreachable.
async fn latest(config: &Config, source: Source, key: &str) -> Result<()> {
    let state = build_state(config).await?;

    let record = state
        .weather_service
        .latest(source.as_str(), key)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    print_record(&record);

    Ok(())
}

fn print_record(record: &ExternalData) {
    println!("{}", "📄 Latest record".bright_blue().bold());
    println!();
    println!("  ID:         {}", record.id.to_string().bright_white());
    println!("  Source:     {}", record.source.cyan());
    println!("  Key:        {}", record.key_name.cyan());
    println!(
        "  Fetched at: {}",
        record.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Payload:    {}", record.payload.dimmed());
    println!();
}

/// Displays record counts grouped by source.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT source, COUNT(*) FROM external_data GROUP BY source ORDER BY source",
    )
    .fetch_all(pool)
    .await?;

    let keys_count: i64 =
        sqlx::query_scalar("SELECT COUNT(DISTINCT key_name) FROM external_data")
            .fetch_one(pool)
            .await?;

    if rows.is_empty() {
        println!("{}", "  No records yet".yellow());
    }
    for (source, count) in &rows {
        println!(
            "  {:<18} {}",
            format!("{}:", source),
            count.to_string().bright_green().bold()
        );
    }
    println!(
        "  {:<18} {}",
        "Distinct keys:",
        keys_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
