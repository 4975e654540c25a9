//! Article sources and the fetch/merge stage.
//!
//! | Source | Module | Notes |
//! |--------|--------|-------|
//! | GDELT DOC 2.0 | [`gdelt`] | One query per configured language |
//! | RSS 2.0 feeds | [`rss`] | Optional, queried after GDELT |
//!
//! [`collect_articles`] queries every source in configured order. A source
//! that fails contributes nothing and the others are still used; the merged
//! list is deduplicated by URL (first seen wins) and capped.

pub mod gdelt;
pub mod rss;

use futures::stream::{self, StreamExt};
use itertools::Itertools;
use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::config::{GdeltSettings, RssFeed};
use crate::error::FeedError;
use crate::models::{Article, Language};

/// Access to the external article sources.
pub trait FeedClient {
    /// Recent articles published in `language`, at most `limit`.
    async fn gdelt(&self, language: Language, limit: usize) -> Result<Vec<Article>, FeedError>;

    /// The current items of one RSS feed.
    async fn rss(&self, feed: &RssFeed) -> Result<Vec<Article>, FeedError>;
}

/// [`FeedClient`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    client: Client,
    gdelt: GdeltSettings,
}

impl HttpFeedClient {
    pub fn new(client: Client, gdelt: GdeltSettings) -> Self {
        Self { client, gdelt }
    }
}

impl FeedClient for HttpFeedClient {
    async fn gdelt(&self, language: Language, limit: usize) -> Result<Vec<Article>, FeedError> {
        gdelt::fetch_language(&self.client, &self.gdelt, language, limit).await
    }

    async fn rss(&self, feed: &RssFeed) -> Result<Vec<Article>, FeedError> {
        rss::fetch_feed(&self.client, feed).await
    }
}

/// One query of the fetch stage.
#[derive(Debug, Clone, Copy)]
enum SourceRequest<'a> {
    Gdelt(Language),
    Rss(&'a RssFeed),
    Unrecognized(&'a str),
}

/// Fetch, merge, deduplicate and cap candidate articles.
///
/// Sources are queried one at a time: languages in `languages` order, then
/// `feeds` in order.
///
/// # Arguments
///
/// * `client` - Access to GDELT and RSS
/// * `languages` - Configured language tags; tags GDELT does not know are skipped
/// * `feeds` - RSS feeds queried after GDELT
/// * `max_articles` - Cap on the merged list, also the per-language GDELT limit
///
/// # Returns
///
/// At most `max_articles` articles with unique URLs, first occurrence kept.
/// Per-source failures are logged and skipped; if every source fails the
/// result is empty.
#[instrument(level = "info", skip_all, fields(languages = ?languages, feeds = feeds.len(), max_articles = max_articles))]
pub async fn collect_articles<C: FeedClient>(
    client: &C,
    languages: &[String],
    feeds: &[RssFeed],
    max_articles: usize,
) -> Vec<Article> {
    let requests = languages
        .iter()
        .map(|tag| match Language::from_tag(tag) {
            Some(language) => SourceRequest::Gdelt(language),
            None => SourceRequest::Unrecognized(tag.as_str()),
        })
        .chain(feeds.iter().map(SourceRequest::Rss))
        .collect::<Vec<_>>();

    let batches: Vec<Vec<Article>> = stream::iter(requests)
        .then(|request| async move {
            let result = match request {
                SourceRequest::Gdelt(language) => client.gdelt(language, max_articles).await,
                SourceRequest::Rss(feed) => client.rss(feed).await,
                SourceRequest::Unrecognized(tag) => {
                    warn!(%tag, "Unrecognized GDELT language tag; skipping");
                    return Vec::new();
                }
            };
            match result {
                Ok(articles) => articles,
                Err(e) => {
                    warn!(source = ?request, error = %e, "Feed unavailable; continuing without it");
                    Vec::new()
                }
            }
        })
        .collect()
        .await;

    let fetched = batches.iter().map(Vec::len).sum::<usize>();
    let articles = batches
        .into_iter()
        .flatten()
        .unique_by(|article| article.url.trim().to_string())
        .take(max_articles)
        .collect::<Vec<_>>();

    if articles.is_empty() {
        warn!("No articles found from any source");
    }
    info!(
        fetched,
        unique = articles.len(),
        "Collected candidate articles"
    );
    articles
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::collections::HashMap;

    /// Canned per-language and per-feed answers.
    #[derive(Default)]
    pub(crate) struct FakeFeeds {
        pub languages: HashMap<Language, Result<Vec<Article>, StatusCode>>,
        pub feeds: HashMap<String, Result<Vec<Article>, StatusCode>>,
    }

    impl FakeFeeds {
        pub fn with_language(mut self, language: Language, answer: Result<Vec<Article>, StatusCode>) -> Self {
            self.languages.insert(language, answer);
            self
        }

        pub fn with_feed(mut self, url: &str, answer: Result<Vec<Article>, StatusCode>) -> Self {
            self.feeds.insert(url.to_string(), answer);
            self
        }
    }

    fn answer(
        entry: Option<&Result<Vec<Article>, StatusCode>>,
        limit: usize,
    ) -> Result<Vec<Article>, FeedError> {
        match entry {
            Some(Ok(articles)) => Ok(articles.iter().take(limit).cloned().collect()),
            Some(Err(status)) => Err(FeedError::Status(*status)),
            None => Ok(Vec::new()),
        }
    }

    impl FeedClient for FakeFeeds {
        async fn gdelt(&self, language: Language, limit: usize) -> Result<Vec<Article>, FeedError> {
            answer(self.languages.get(&language), limit)
        }

        async fn rss(&self, feed: &RssFeed) -> Result<Vec<Article>, FeedError> {
            answer(self.feeds.get(&feed.url), usize::MAX)
        }
    }

    pub(crate) fn articles(prefix: &str, n: usize, language: Language) -> Vec<Article> {
        (0..n)
            .map(|i| {
                Article::new(
                    format!("{prefix} headline {i}"),
                    format!("https://{prefix}.example/{i}"),
                    format!("{prefix}.example"),
                    None,
                    language,
                )
            })
            .collect()
    }

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_failed_language_degrades() {
        let client = FakeFeeds::default()
            .with_language(Language::German, Err(StatusCode::SERVICE_UNAVAILABLE))
            .with_language(Language::English, Ok(articles("en", 25, Language::English)));

        let got = collect_articles(&client, &tags(&["german", "english"]), &[], 30).await;

        assert_eq!(got.len(), 25);
        assert!(got.iter().all(|a| a.language == Language::English));
        assert!(got.iter().all(|a| a.fact_check.is_none()));
    }

    #[tokio::test]
    async fn test_order_and_first_seen_dedup() {
        let mut english = articles("en", 3, Language::English);
        // Same story reported in both language queries.
        english[1].url = "https://de.example/0".to_string();
        let client = FakeFeeds::default()
            .with_language(Language::German, Ok(articles("de", 2, Language::German)))
            .with_language(Language::English, Ok(english));

        let got = collect_articles(&client, &tags(&["german", "english"]), &[], 30).await;

        let urls = got.iter().map(|a| a.url.as_str()).collect::<Vec<_>>();
        assert_eq!(
            urls,
            vec![
                "https://de.example/0",
                "https://de.example/1",
                "https://en.example/0",
                "https://en.example/2",
            ]
        );
        assert_eq!(got[0].language, Language::German);
    }

    #[tokio::test]
    async fn test_cap_applies_to_merged_list() {
        let client = FakeFeeds::default()
            .with_language(Language::German, Ok(articles("de", 20, Language::German)))
            .with_language(Language::English, Ok(articles("en", 20, Language::English)));

        let got = collect_articles(&client, &tags(&["german", "english"]), &[], 30).await;

        assert_eq!(got.len(), 30);
        assert_eq!(got[19].url, "https://de.example/19");
        assert_eq!(got[29].url, "https://en.example/9");
    }

    #[tokio::test]
    async fn test_unrecognized_tag_contributes_nothing() {
        let client = FakeFeeds::default()
            .with_language(Language::English, Ok(articles("en", 2, Language::English)));

        let got = collect_articles(&client, &tags(&["klingon", "english"]), &[], 30).await;

        assert_eq!(got.len(), 2);
    }

    #[tokio::test]
    async fn test_any_gdelt_language_is_queried() {
        let client = FakeFeeds::default()
            .with_language(Language::Arabic, Ok(articles("ar", 3, Language::Arabic)))
            .with_language(Language::Japanese, Ok(articles("ja", 1, Language::Japanese)))
            .with_language(Language::English, Ok(articles("en", 2, Language::English)));

        let got = collect_articles(&client, &tags(&["arabic", "ja", "english"]), &[], 30).await;

        assert_eq!(got.len(), 6);
        assert_eq!(got[0].language, Language::Arabic);
        assert_eq!(got[3].language, Language::Japanese);
        assert_eq!(got[5].url, "https://en.example/1");
    }

    #[tokio::test]
    async fn test_total_failure_is_empty() {
        let client = FakeFeeds::default()
            .with_language(Language::German, Err(StatusCode::BAD_GATEWAY))
            .with_language(Language::English, Err(StatusCode::TOO_MANY_REQUESTS));

        let got = collect_articles(&client, &tags(&["german", "english"]), &[], 30).await;

        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn test_rss_feeds_follow_gdelt() {
        let feeds = vec![
            RssFeed {
                url: "https://broken.example/rss".to_string(),
                language: Language::English,
            },
            RssFeed {
                url: "https://bbc.example/rss".to_string(),
                language: Language::English,
            },
        ];
        let mut rss_items = articles("bbc", 2, Language::English);
        rss_items.push(articles("en", 1, Language::English).remove(0));
        let client = FakeFeeds::default()
            .with_language(Language::English, Ok(articles("en", 1, Language::English)))
            .with_feed("https://broken.example/rss", Err(StatusCode::NOT_FOUND))
            .with_feed("https://bbc.example/rss", Ok(rss_items));

        let got = collect_articles(&client, &tags(&["english"]), &feeds, 30).await;

        let urls = got.iter().map(|a| a.url.as_str()).collect::<Vec<_>>();
        assert_eq!(
            urls,
            vec!["https://en.example/0", "https://bbc.example/0", "https://bbc.example/1"]
        );
    }
}
