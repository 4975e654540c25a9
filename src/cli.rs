//! Command-line interface definitions for the crawler.
//!
//! Every option can also come from the environment, which is how the
//! scheduled CI job configures a run. None of them is required.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
///
/// Values given here override the YAML config file, which overrides the
/// built-in defaults.
///
/// # Examples
///
/// ```sh
/// # Defaults: german + english, 30 articles, ./results
/// factcheck_crawler
///
/// # Explicit languages and cap
/// factcheck_crawler --languages german,english,french --max-articles 50
///
/// # Enable fact-check annotation
/// GOOGLE_FACTCHECK_API_KEY=... factcheck_crawler -r ./public/results
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory receiving the archive and latest files
    #[arg(short, long, env = "RESULTS_DIR")]
    pub results_dir: Option<PathBuf>,

    /// Comma-separated GDELT source languages, e.g. "german,english"
    #[arg(short, long, env = "GDELT_LANGUAGES", value_delimiter = ',')]
    pub languages: Option<Vec<String>>,

    /// Maximum number of articles in the result set
    #[arg(short, long, env = "MAX_ARTICLES")]
    pub max_articles: Option<usize>,

    /// Google Fact Check Tools API key; annotation is skipped without it
    #[arg(long, env = "GOOGLE_FACTCHECK_API_KEY", hide_env_values = true)]
    pub factcheck_api_key: Option<String>,
}
