//! CSV rendering of a [`ResultSet`], one row per article.
//!
//! The header is always written, so an empty run still yields a valid file.

use serde::Serialize;

use crate::error::PersistenceError;
use crate::models::{Article, ResultSet};

/// Column order of every CSV output.
pub const HEADER: [&str; 12] = [
    "title",
    "url",
    "source",
    "language",
    "publish_time",
    "fact_check_claim",
    "fact_check_rating",
    "fact_check_reviewer",
    "fact_check_url",
    "risk_score",
    "risk_category",
    "source_category",
];

#[derive(Debug, Serialize)]
struct Row<'a> {
    title: &'a str,
    url: &'a str,
    source: &'a str,
    language: &'static str,
    publish_time: String,
    fact_check_claim: Option<&'a str>,
    fact_check_rating: Option<&'a str>,
    fact_check_reviewer: Option<&'a str>,
    fact_check_url: Option<&'a str>,
    risk_score: f64,
    risk_category: String,
    source_category: Option<&'static str>,
}

impl<'a> From<&'a Article> for Row<'a> {
    fn from(article: &'a Article) -> Self {
        let fact_check = article.fact_check.as_ref();
        Row {
            title: &article.title,
            url: &article.url,
            source: &article.source,
            language: article.language.gdelt_name(),
            publish_time: article
                .publish_time
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            fact_check_claim: fact_check.map(|f| f.claim_text.as_str()),
            fact_check_rating: fact_check.map(|f| f.rating.as_str()),
            fact_check_reviewer: fact_check.map(|f| f.reviewer.as_str()),
            fact_check_url: fact_check.map(|f| f.review_url.as_str()),
            risk_score: article.risk.score,
            risk_category: article.risk.category.to_string(),
            source_category: article.risk.source_category.map(|c| c.as_str()),
        }
    }
}

/// Render `result_set` as CSV: the header row, then one row per article.
///
/// Absent values (no fact-check, unknown publish time) are empty cells.
pub fn render(result_set: &ResultSet) -> Result<Vec<u8>, PersistenceError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for article in &result_set.articles {
        writer.serialize(Row::from(article))?;
    }
    writer
        .into_inner()
        .map_err(|e| PersistenceError::Csv(e.into_error().into()))
}
