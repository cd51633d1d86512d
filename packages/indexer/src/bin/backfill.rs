use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use indexer::config::Config;
use indexer::db::Database;
use indexer::sync::{DelegationsClient, HistoricSync, BACKFILL_PAGE_SIZE};
use indexer::tzkt::{TzktClient, MAX_LIMIT};
use indexer::utils::format::format_elapsed;
use indexer::utils::{logger, retry::RetryPolicy};

/// Load every Tezos delegation of a calendar year into the database.
#[derive(Debug, Parser)]
#[command(name = "backfill", version)]
struct Args {
    /// Calendar year to load (2018 or later)
    #[arg(long)]
    year: i32,

    /// Delegations requested per page
    #[arg(long, default_value_t = BACKFILL_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..=MAX_LIMIT as i64))]
    page_size: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_logger();

    println!("{}", "=".repeat(80).bright_blue());
    println!("{}", "TEZOS DELEGATIONS BACKFILL".bold().bright_green());
    println!("{}", format!("Year {}, {} per page", args.year, args.page_size).bright_cyan());
    println!("{}", "=".repeat(80).bright_blue());

    let config = Config::load().context("Failed to load configuration")?;

    let db = Database::connect_with_retry(
        &config.database_url,
        config.db_max_connections,
        RetryPolicy::new(config.retry_delay, config.max_retries),
    )
    .await
    .context("Failed to connect to database")?
    .migrate()
    .await?;

    let tzkt = TzktClient::new(&config.tzkt_base_url, config.http_timeout)
        .context("Failed to create TzKT client")?;

    let client = DelegationsClient::new(Arc::new(tzkt), Arc::new(db));
    let historic = HistoricSync::new(client).with_page_size(args.page_size);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling backfill");
            on_signal.cancel();
        }
    });

    let report = historic
        .fetch_year(args.year, &cancel)
        .await
        .with_context(|| format!("Backfill of {} failed", args.year))?;

    info!("Backfill report: {:?}", report);
    println!();
    println!("{}", "Backfill complete".bold().bright_green());
    println!("  {:<10} {}", "requests".bright_yellow(), report.requests);
    println!("  {:<10} {}", "fetched".bright_yellow(), report.fetched);
    println!("  {:<10} {}", "skipped".bright_yellow(), report.skipped);
    println!("  {:<10} {}", "inserted".bright_yellow(), report.inserted);
    println!("  {:<10} {}", "elapsed".bright_yellow(), format_elapsed(report.elapsed));

    Ok(())
}
