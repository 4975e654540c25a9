//! RSS 2.0 feeds, queried after GDELT when configured.

use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::Html;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

use crate::config::RssFeed;
use crate::error::FeedError;
use crate::models::Article;
use crate::utils::domain_of;

/// Items taken from the top of each feed.
pub const MAX_ITEMS_PER_FEED: usize = 10;

const FEED_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; NewsBot/1.0)";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

#[instrument(level = "info", skip(client), fields(url = %feed.url, language = %feed.language))]
pub async fn fetch_feed(client: &Client, feed: &RssFeed) -> Result<Vec<Article>, FeedError> {
    let response = client
        .get(&feed.url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .timeout(FEED_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status(status));
    }

    let body = response.text().await?;
    let articles = parse_feed(&body, feed)?;
    info!(count = articles.len(), "Fetched RSS items");
    Ok(articles)
}

/// Parse an RSS document into at most [`MAX_ITEMS_PER_FEED`] articles.
pub fn parse_feed(xml: &str, feed: &RssFeed) -> Result<Vec<Article>, FeedError> {
    let rss: Rss = quick_xml::de::from_str(xml)?;
    let articles = rss
        .channel
        .items
        .into_iter()
        .take(MAX_ITEMS_PER_FEED)
        .filter_map(|item| {
            let url = item.link?.trim().to_string();
            let title = strip_markup(&item.title?);
            if url.is_empty() || title.is_empty() {
                return None;
            }
            let source = domain_of(&url).unwrap_or_default();
            let publish_time = item.pub_date.as_deref().and_then(parse_pub_date);
            Some(Article::new(title, url, source, publish_time, feed.language))
        })
        .collect();
    Ok(articles)
}

/// Plain text of a title that may carry inline HTML.
fn strip_markup(raw: &str) -> String {
    let text = if raw.contains('<') {
        Html::parse_fragment(raw)
            .root_element()
            .text()
            .collect::<String>()
    } else {
        raw.to_string()
    };
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
