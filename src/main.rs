//! # Book News
//!
//! Collects recent book and literature articles from Korean newspaper RSS
//! feeds and writes them to a single JSON file for a static reading page.
//!
//! ## Usage
//!
//! ```sh
//! book_news -o ./public/data.json
//! ```
//!
//! ## Architecture
//!
//! The run is a sequential pipeline, one source at a time:
//! 1. **Feed**: fetch and parse the publisher's RSS feed
//! 2. **Filter**: keep recent entries whose titles are about books
//! 3. **Extract**: fetch the article page, strip noise nodes, locate the body
//!    through the source's selector cascade
//! 4. **Clean**: drop noise lines and normalize paragraph spacing
//! 5. **Output**: write every accepted article, keyed by source, as JSON

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod cleaner;
mod cli;
mod config;
mod filter;
mod models;
mod outputs;
mod scrapers;
mod sources;
mod utils;

use aggregator::Aggregator;
use cli::Cli;
use config::CrawlConfig;
use outputs::json;
use utils::{ensure_parent_writable, today};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("book_news starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = CrawlConfig::resolve(&args)?;
    info!(
        sources = config.sources.len(),
        max_per_source = config.limits.max_per_source,
        recency_days = config.limits.recency_days,
        "Configuration ready"
    );

    // Fail before crawling if the result could not be saved anyway
    if let Err(e) = ensure_parent_writable(Path::new(&args.output)).await {
        error!(
            path = %args.output,
            error = %e,
            "Output location is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let client = scrapers::http::build_client(&config.http).map_err(|e| e as Box<dyn Error>)?;
    let results = Aggregator::new(&client, &config).run(today()).await;

    if let Err(e) = json::write_result_set(&results, &args.output).await {
        error!(path = %args.output, error = %e, "Failed to write JSON");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        sources = results.source_ids().count(),
        articles = results.article_count(),
        path = %args.output,
        "Execution complete"
    );

    Ok(())
}
