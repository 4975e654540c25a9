//! GDELT DOC 2.0 article list queries.
//!
//! One request per language, `mode=artlist`, newest first. GDELT answers
//! query errors with a plain-text body and HTTP 200, so the body is checked
//! before it is parsed as JSON.
//!
//! ```text
//! {"articles": [{"url": "...", "title": "...", "seendate": "20250506T143000Z",
//!                "domain": "spiegel.de", "language": "German", ...}]}
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, Request, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::config::GdeltSettings;
use crate::error::FeedError;
use crate::models::{Article, Language};
use crate::utils::{domain_of, truncate_for_log};

/// GDELT refuses `maxrecords` above this.
pub const GDELT_MAX_RECORDS: usize = 250;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct GdeltResponse {
    #[serde(default)]
    articles: Vec<GdeltArticle>,
}

#[derive(Debug, Deserialize)]
struct GdeltArticle {
    url: Option<String>,
    title: Option<String>,
    #[serde(rename = "seendate")]
    seen_date: Option<String>,
    domain: Option<String>,
}

/// The `query` parameter: topic keywords restricted to one source language.
///
/// OR'd keywords must be parenthesized or GDELT rejects the query.
pub fn build_query(settings: &GdeltSettings, language: Language) -> String {
    let topic = settings
        .query
        .as_deref()
        .unwrap_or_else(|| language.topic_query());
    if topic.contains(" OR ") && !topic.trim_start().starts_with('(') {
        format!("({}) sourcelang:{}", topic, language.gdelt_name())
    } else {
        format!("{} sourcelang:{}", topic, language.gdelt_name())
    }
}

/// Build the article list request for one language.
///
/// `maxrecords` is `limit` clamped to `1..=250`.
///
/// # Errors
///
/// Returns [`FeedError::Http`] when the endpoint is not a valid URL.
pub fn build_request(
    client: &Client,
    settings: &GdeltSettings,
    language: Language,
    limit: usize,
) -> Result<Request, FeedError> {
    let query = build_query(settings, language);
    let max_records = limit.clamp(1, GDELT_MAX_RECORDS).to_string();

    let request = client
        .get(&settings.endpoint)
        .query(&[
            ("query", query.as_str()),
            ("mode", "artlist"),
            ("maxrecords", max_records.as_str()),
            ("timespan", settings.timespan.as_str()),
            ("format", "json"),
            ("sort", "datedesc"),
        ])
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .header(reqwest::header::ACCEPT, "application/json")
        .timeout(settings.timeout())
        .build()?;
    Ok(request)
}

/// Query the article list for one language.
#[instrument(level = "info", skip(client, settings), fields(%language))]
pub async fn fetch_language(
    client: &Client,
    settings: &GdeltSettings,
    language: Language,
    limit: usize,
) -> Result<Vec<Article>, FeedError> {
    let request = build_request(client, settings, language, limit)?;
    debug!(url = %request.url(), "Querying GDELT");

    let response = client.execute(request).await?;
    let status = response.status();
    let body = response.text().await?;
    let articles = parse_response(status, &body, language)?;
    info!(count = articles.len(), "Fetched GDELT articles");
    Ok(articles)
}

/// Check the HTTP status, then parse the body.
///
/// # Errors
///
/// [`FeedError::Status`] for any non-2xx status, otherwise the errors of
/// [`parse_articles`].
pub fn parse_response(
    status: StatusCode,
    body: &str,
    language: Language,
) -> Result<Vec<Article>, FeedError> {
    if !status.is_success() {
        debug!(%status, body = %truncate_for_log(body.trim(), 120), "GDELT returned an error status");
        return Err(FeedError::Status(status));
    }
    parse_articles(body, language)
}

/// Turn a GDELT response body into articles, skipping unusable entries.
pub fn parse_articles(body: &str, language: Language) -> Result<Vec<Article>, FeedError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }
    if !body.starts_with('{') {
        return Err(FeedError::NonJson {
            preview: truncate_for_log(body, 120),
        });
    }

    let response: GdeltResponse = serde_json::from_str(body)?;
    let articles = response
        .articles
        .into_iter()
        .filter_map(|entry| {
            let url = entry.url?.trim().to_string();
            let title = entry.title.unwrap_or_default().trim().to_string();
            if url.is_empty() || title.is_empty() {
                return None;
            }
            let source = entry
                .domain
                .filter(|d| !d.trim().is_empty())
                .or_else(|| domain_of(&url))
                .unwrap_or_default();
            let publish_time = entry.seen_date.as_deref().and_then(parse_seen_date);
            Some(Article::new(title, url, source, publish_time, language))
        })
        .collect();
    Ok(articles)
}

/// Parse GDELT's `seendate`, e.g. `20250506T143000Z`.
pub fn parse_seen_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y%m%dT%H%M%SZ")
        .ok()
        .map(|naive| naive.and_utc())
}
