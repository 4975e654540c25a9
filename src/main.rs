//! # factcheck_crawler
//!
//! A scheduled crawler that pulls recent political and economic news from
//! the GDELT DOC API, optionally matches each headline against published
//! fact-checks, scores it for misinformation risk, and writes the result as
//! static JSON and CSV files for a dashboard.
//!
//! ## Usage
//!
//! ```sh
//! GDELT_LANGUAGES=german,english MAX_ARTICLES=30 factcheck_crawler
//! ```
//!
//! ## Architecture
//!
//! One linear run per invocation:
//! 1. **Fetching**: one GDELT query per language, then optional RSS feeds;
//!    merged, deduplicated by URL and capped
//! 2. **Annotating**: one fact-check lookup per article, skipped entirely
//!    when no API key is configured
//! 3. **Scoring**: heuristic risk per article
//! 4. **Writing**: timestamped archive files plus `latest.json`/`latest.csv`
//!
//! Source and lookup failures degrade the result; only a failed write makes
//! the process exit non-zero.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod domains;
mod error;
mod factcheck;
mod feeds;
mod models;
mod outputs;
mod pipeline;
mod risk;
mod utils;

use cli::Cli;
use config::Config;
use factcheck::google_lookup;
use feeds::HttpFeedClient;
use outputs::LatestPointer;
use utils::ensure_writable_dir;

#[tokio::main]
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
    info!("factcheck_crawler starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.results_dir, ?args.languages, ?args.max_articles, "Parsed CLI arguments");

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        languages = ?config.languages,
        max_articles = config.max_articles,
        rss_feeds = config.rss_feeds.len(),
        annotation = config.annotation_enabled(),
        results_dir = %config.results_dir.display(),
        "Configuration loaded"
    );

    // Early check: a run that cannot be persisted is pointless.
    if let Err(e) = ensure_writable_dir(&config.results_dir).await {
        error!(
            path = %config.results_dir.display(),
            error = %e,
            "Results directory is not writable"
        );
        return Err(e.into());
    }

    let client = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()?;
    let feeds = HttpFeedClient::new(client.clone(), config.gdelt.clone());
    let lookup = config
        .factcheck_api_key
        .clone()
        .map(|key| google_lookup(client.clone(), &config.factcheck, key));
    let mut latest = LatestPointer::new(&config.results_dir);

    let summary = match pipeline::run(&config, &feeds, lookup.as_ref(), Utc::now(), &mut latest).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Failed to persist results");
            return Err(e.into());
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = summary.articles,
        archive = %summary.archive_json.display(),
        latest = %latest.paths().json.display(),
        "Execution complete"
    );

    Ok(())
}
