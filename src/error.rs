//! Error types for each pipeline stage.
//!
//! Only [`PersistenceError`] and [`ConfigError`] ever reach `main`. Feed and
//! lookup errors are recovered where they occur and end up in the log.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// A single feed query could not produce articles.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed answered with HTTP {0}")]
    Status(StatusCode),

    #[error("feed answered with a non-JSON body: {preview}")]
    NonJson { preview: String },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::de::DeError),
}

/// A fact-check lookup failed. The article is emitted without a verdict.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("fact-check API answered with HTTP {0}")]
    Status(StatusCode),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl LookupError {
    /// Whether retrying the same request can reasonably succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LookupError::Http(e) => e.is_timeout() || e.is_connect(),
            LookupError::Status(status) => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            LookupError::Json(_) => false,
        }
    }
}

/// The writer could not create or finalize an output file. Fatal to the run.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
}

impl PersistenceError {
    /// An IO failure on `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
