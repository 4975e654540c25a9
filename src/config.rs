//! Run configuration.
//!
//! A [`Config`] is resolved once at startup from three layers, highest
//! precedence first: command-line flags and environment variables, an
//! optional YAML file, and the built-in defaults. The fact-check credential is
//! only ever taken from the command line or the environment.
//!
//! ```yaml
//! languages: [german, english]
//! max_articles: 30
//! results_dir: results
//! gdelt:
//!   timespan: 24h
//! factcheck:
//!   max_retries: 2
//! rss_feeds:
//!   - url: https://www.tagesschau.de/index~rss2.xml
//!     language: german
//! unreliable_domains: [rumours.example]
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::models::Language;

pub const DEFAULT_LANGUAGES: [&str; 2] = ["german", "english"];
pub const DEFAULT_MAX_ARTICLES: usize = 30;
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// GDELT DOC API settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GdeltSettings {
    pub endpoint: String,
    /// Look-back window, in GDELT syntax (`24h`, `3d`, ...).
    pub timespan: String,
    /// Replaces each language's default topic keywords when set.
    pub query: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GdeltSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.gdeltproject.org/api/v2/doc/doc".to_string(),
            timespan: "24h".to_string(),
            query: None,
            timeout_secs: 30,
        }
    }
}

impl GdeltSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Google Fact Check Tools settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactCheckSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Retries after the first attempt, transient failures only.
    pub max_retries: usize,
    pub base_delay_ms: u64,
}

impl Default for FactCheckSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://factchecktools.googleapis.com/v1alpha1/claims:search".to_string(),
            timeout_secs: 10,
            max_retries: 2,
            base_delay_ms: 1000,
        }
    }
}

impl FactCheckSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

/// An RSS feed queried after GDELT.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RssFeed {
    pub url: String,
    pub language: Language,
}

/// Shape of the optional YAML file. Absent keys fall back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    languages: Option<Vec<String>>,
    max_articles: Option<usize>,
    results_dir: Option<PathBuf>,
    gdelt: Option<GdeltSettings>,
    factcheck: Option<FactCheckSettings>,
    rss_feeds: Option<Vec<RssFeed>>,
    unreliable_domains: Option<Vec<String>>,
}

/// Fully resolved, immutable configuration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Language tags in query order. Unrecognized tags are kept and skipped
    /// by the fetcher.
    pub languages: Vec<String>,
    pub max_articles: usize,
    pub results_dir: PathBuf,
    /// Presence enables the fact-check stage.
    pub factcheck_api_key: Option<String>,
    pub gdelt: GdeltSettings,
    pub factcheck: FactCheckSettings,
    pub rss_feeds: Vec<RssFeed>,
    /// Extra domains scored as unreliable, on top of the built-in table.
    pub unreliable_domains: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            max_articles: DEFAULT_MAX_ARTICLES,
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            factcheck_api_key: None,
            gdelt: GdeltSettings::default(),
            factcheck: FactCheckSettings::default(),
            rss_feeds: Vec::new(),
            unreliable_domains: Vec::new(),
        }
    }
}

impl Config {
    /// Resolve the configuration for this run from the parsed CLI.
    #[instrument(level = "info", skip_all, fields(config_file = ?cli.config))]
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => Some(read_file_config(path)?),
            None => None,
        };
        let config = Self::resolve(cli, file)?;
        debug!(?config.languages, config.max_articles, results_dir = %config.results_dir.display(), "Resolved configuration");
        Ok(config)
    }

    fn resolve(cli: &Cli, file: Option<FileConfig>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(file) = file {
            if let Some(languages) = file.languages {
                config.languages = languages;
            }
            if let Some(max) = file.max_articles {
                config.max_articles = max;
            }
            if let Some(dir) = file.results_dir {
                config.results_dir = dir;
            }
            if let Some(gdelt) = file.gdelt {
                config.gdelt = gdelt;
            }
            if let Some(factcheck) = file.factcheck {
                config.factcheck = factcheck;
            }
            if let Some(feeds) = file.rss_feeds {
                config.rss_feeds = feeds;
            }
            if let Some(domains) = file.unreliable_domains {
                config.unreliable_domains = domains;
            }
        }

        if let Some(languages) = &cli.languages {
            config.languages = languages.clone();
        }
        if let Some(max) = cli.max_articles {
            config.max_articles = max;
        }
        if let Some(dir) = &cli.results_dir {
            config.results_dir = dir.clone();
        }
        // CI secrets that are not set expand to an empty string.
        config.factcheck_api_key = cli
            .factcheck_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        config.languages = config
            .languages
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_articles == 0 {
            return Err(ConfigError::Invalid(
                "max_articles must be at least 1".to_string(),
            ));
        }
        if self.languages.is_empty() && self.rss_feeds.is_empty() {
            return Err(ConfigError::Invalid(
                "no languages and no RSS feeds configured".to_string(),
            ));
        }
        Ok(())
    }

    pub fn annotation_enabled(&self) -> bool {
        self.factcheck_api_key.is_some()
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_file_config(&raw)
}

fn parse_file_config(raw: &str) -> Result<FileConfig, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}
