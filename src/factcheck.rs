//! Fact-check annotation with retry on transient failures.
//!
//! # Architecture
//!
//! - [`ClaimLookup`]: searches published fact-checks for a piece of text
//! - [`GoogleFactCheck`]: the Google Fact Check Tools `claims:search` client
//! - [`RetryLookup`]: decorator adding exponential backoff to any lookup
//! - [`annotate_articles`]: the pipeline stage, one lookup per article
//!
//! # Retry Strategy
//!
//! Only transient failures (timeouts, connection errors, HTTP 429 and 5xx)
//! are retried. The delay doubles from the base delay, is capped at 30
//! seconds, and gets 0-250ms of random jitter.

use futures::stream::{self, StreamExt};
use rand::{Rng, rng};
use reqwest::{Client, Request, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use crate::config::FactCheckSettings;
use crate::error::LookupError;
use crate::models::{Article, FactCheckAnnotation, Language};
use crate::utils::{truncate_chars, truncate_for_log};

/// The API rejects longer queries.
pub const MAX_QUERY_CHARS: usize = 200;

/// Searches published fact-checks for a claim.
pub trait ClaimLookup {
    /// The best-matching review of `query`, or `None` when nothing matches.
    async fn lookup(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Option<FactCheckAnnotation>, LookupError>;
}

/// What the annotator learned about one article.
#[derive(Debug)]
pub enum AnnotationOutcome {
    Matched(FactCheckAnnotation),
    NoMatch,
    Unavailable(LookupError),
    /// No credential configured; nothing was looked up.
    Disabled,
}

impl AnnotationOutcome {
    pub fn into_annotation(self) -> Option<FactCheckAnnotation> {
        match self {
            AnnotationOutcome::Matched(annotation) => Some(annotation),
            _ => None,
        }
    }
}

/// Client for `factchecktools.googleapis.com/v1alpha1/claims:search`.
pub struct GoogleFactCheck {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout: StdDuration,
}

impl GoogleFactCheck {
    /// Client for `settings.endpoint`, authenticated with `api_key`.
    pub fn new(client: Client, settings: &FactCheckSettings, api_key: String) -> Self {
        Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key,
            timeout: settings.timeout(),
        }
    }

    /// Build a `claims:search` request for the best match of `query`.
    ///
    /// The query is cut to [`MAX_QUERY_CHARS`] characters.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Http`] when the endpoint is not a valid URL.
    pub fn build_request(&self, query: &str, language: Language) -> Result<Request, LookupError> {
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("query", truncate_chars(query, MAX_QUERY_CHARS)),
                ("languageCode", language.iso_code()),
                ("pageSize", "1"),
                ("key", self.api_key.as_str()),
            ])
            .timeout(self.timeout)
            .build()?;
        Ok(request)
    }
}

impl fmt::Debug for GoogleFactCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleFactCheck")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct ClaimSearchResponse {
    #[serde(default)]
    claims: Vec<Claim>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claim {
    text: Option<String>,
    #[serde(default)]
    claim_review: Vec<ClaimReview>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimReview {
    publisher: Option<Publisher>,
    url: Option<String>,
    textual_rating: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Publisher {
    name: Option<String>,
    site: Option<String>,
}

/// Pick the first review of the first claim from a `claims:search` body.
pub fn parse_claim_search(
    body: &str,
    query: &str,
) -> Result<Option<FactCheckAnnotation>, serde_json::Error> {
    let response: ClaimSearchResponse = serde_json::from_str(body)?;
    let Some(claim) = response.claims.into_iter().next() else {
        return Ok(None);
    };
    let Some(review) = claim.claim_review.into_iter().next() else {
        return Ok(None);
    };

    let reviewer = review
        .publisher
        .and_then(|p| p.name.filter(|n| !n.is_empty()).or(p.site))
        .unwrap_or_default();
    Ok(Some(FactCheckAnnotation {
        claim_text: claim.text.unwrap_or_else(|| query.to_string()),
        rating: review.textual_rating.unwrap_or_default(),
        reviewer,
        review_url: review.url.unwrap_or_default(),
    }))
}

/// Check the HTTP status, then parse a `claims:search` body.
///
/// # Errors
///
/// [`LookupError::Status`] for any non-2xx status, [`LookupError::Json`]
/// for an unparseable body.
pub fn parse_lookup_response(
    status: StatusCode,
    body: &str,
    query: &str,
) -> Result<Option<FactCheckAnnotation>, LookupError> {
    if !status.is_success() {
        return Err(LookupError::Status(status));
    }
    Ok(parse_claim_search(body, query)?)
}

impl ClaimLookup for GoogleFactCheck {
    #[instrument(level = "debug", skip_all, fields(%language))]
    async fn lookup(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Option<FactCheckAnnotation>, LookupError> {
        let t0 = Instant::now();
        let request = self.build_request(query, language)?;
        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        let annotation = parse_lookup_response(status, &body, truncate_chars(query, MAX_QUERY_CHARS))?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            matched = annotation.is_some(),
            "Fact-check lookup finished"
        );
        Ok(annotation)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`ClaimLookup`].
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryLookup<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryLookup<T>
where
    T: ClaimLookup,
{
    /// Wrap `inner`, retrying transient failures up to `max_retries` times.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    fn delay_for(&self, attempt: usize) -> StdDuration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryLookup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryLookup")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> ClaimLookup for RetryLookup<T>
where
    T: ClaimLookup,
{
    async fn lookup(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Option<FactCheckAnnotation>, LookupError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.lookup(query, language).await {
                Ok(found) => return Ok(found),
                Err(e) => {
                    attempt += 1;
                    let elapsed_ms_total = total_t0.elapsed().as_millis() as u64;

                    if !e.is_transient() || attempt > self.max_retries {
                        debug!(attempt, elapsed_ms_total, error = %e, "lookup() giving up");
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total,
                        ?delay,
                        error = %e,
                        "lookup() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Build the production lookup: Google Fact Check wrapped in [`RetryLookup`].
pub fn google_lookup(
    client: Client,
    settings: &FactCheckSettings,
    api_key: String,
) -> RetryLookup<GoogleFactCheck> {
    RetryLookup::new(
        GoogleFactCheck::new(client, settings, api_key),
        settings.max_retries,
        settings.base_delay(),
    )
}

/// Look up every article's title, one request at a time.
///
/// # Arguments
///
/// * `articles` - Articles to annotate, in output order
/// * `lookup` - The fact-check backend, `None` when no credential is configured
///
/// # Returns
///
/// One [`AnnotationOutcome`] per article, in the same order. With
/// `lookup == None` no request is made and every outcome is
/// [`AnnotationOutcome::Disabled`]. A failed lookup never fails the stage.
#[instrument(level = "info", skip_all, fields(articles = articles.len(), enabled = lookup.is_some()))]
pub async fn annotate_articles<L: ClaimLookup>(
    articles: &[Article],
    lookup: Option<&L>,
) -> Vec<AnnotationOutcome> {
    let Some(lookup) = lookup else {
        info!("No fact-check credential configured; skipping annotation");
        return articles.iter().map(|_| AnnotationOutcome::Disabled).collect();
    };

    let outcomes: Vec<AnnotationOutcome> = stream::iter(articles.iter().enumerate())
        .then(|(i, article)| async move {
            match lookup.lookup(&article.title, article.language).await {
                Ok(Some(annotation)) => {
                    debug!(index = i, url = %article.url, rating = %annotation.rating, "Fact-check match");
                    AnnotationOutcome::Matched(annotation)
                }
                Ok(None) => AnnotationOutcome::NoMatch,
                Err(e) => {
                    warn!(
                        index = i,
                        url = %article.url,
                        title = %truncate_for_log(&article.title, 80),
                        error = %e,
                        "Fact-check lookup failed; emitting article without annotation"
                    );
                    AnnotationOutcome::Unavailable(e)
                }
            }
        })
        .collect()
        .await;

    let matched = outcomes
        .iter()
        .filter(|o| matches!(o, AnnotationOutcome::Matched(_)))
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, AnnotationOutcome::Unavailable(_)))
        .count();
    if failed == outcomes.len() && failed > 0 {
        error!(failed, "Every fact-check lookup failed");
    }
    info!(total = outcomes.len(), matched, failed, "Completed fact-check annotation");
    outcomes
}
