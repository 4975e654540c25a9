//! The crawl run: fetch, annotate, score, write.
//!
//! Stages run strictly in sequence. Fetch and annotation failures only
//! shrink or thin out the result; the run fails only when the result set
//! cannot be persisted.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::PersistenceError;
use crate::factcheck::{AnnotationOutcome, ClaimLookup, annotate_articles};
use crate::feeds::{FeedClient, collect_articles};
use crate::models::{ResultSet, RiskCategory};
use crate::outputs::{ArchiveTarget, LatestPointer, write_result_set};
use crate::risk;

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub articles: usize,
    pub annotated: usize,
    pub failed_lookups: usize,
    /// Failed lookups that a later run may well get through (timeouts, 429, 5xx).
    pub transient_failures: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    pub archive_json: PathBuf,
}

/// Execute one crawl and persist its [`ResultSet`].
#[instrument(level = "info", skip_all, fields(%generated_at))]
pub async fn run<C, L>(
    config: &Config,
    feeds: &C,
    lookup: Option<&L>,
    generated_at: DateTime<Utc>,
    latest: &mut LatestPointer,
) -> Result<RunSummary, PersistenceError>
where
    C: FeedClient,
    L: ClaimLookup,
{
    let mut articles = collect_articles(
        feeds,
        &config.languages,
        &config.rss_feeds,
        config.max_articles,
    )
    .await;

    let outcomes = annotate_articles(&articles, lookup).await;
    let lookup_errors = outcomes
        .iter()
        .filter_map(|o| match o {
            AnnotationOutcome::Unavailable(e) => Some(e),
            _ => None,
        })
        .collect::<Vec<_>>();
    let failed_lookups = lookup_errors.len();
    let transient_failures = lookup_errors.iter().filter(|e| e.is_transient()).count();
    if failed_lookups > transient_failures {
        warn!(
            permanent = failed_lookups - transient_failures,
            "Fact-check lookups rejected; check the API key and quota"
        );
    }

    for (article, outcome) in articles.iter_mut().zip(outcomes) {
        article.fact_check = outcome.into_annotation();
        let assessed = risk::assess(article, article.fact_check.as_ref(), &config.unreliable_domains);
        article.risk = assessed;
    }

    let result_set = ResultSet::new(generated_at, articles, config.max_articles);
    let archive = ArchiveTarget::reserve(&config.results_dir, &generated_at).await?;
    let summary = RunSummary {
        articles: result_set.count,
        annotated: result_set.annotated_count(),
        failed_lookups,
        transient_failures,
        high_risk: result_set.count_by_risk(RiskCategory::High),
        medium_risk: result_set.count_by_risk(RiskCategory::Medium),
        low_risk: result_set.count_by_risk(RiskCategory::Low),
        archive_json: archive.paths().json.clone(),
    };

    write_result_set(&result_set, &archive, latest).await?;

    info!(
        articles = summary.articles,
        annotated = summary.annotated,
        failed_lookups = summary.failed_lookups,
        transient_failures = summary.transient_failures,
        high = summary.high_risk,
        medium = summary.medium_risk,
        low = summary.low_risk,
        "Run summary"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::DomainCategory;
    use crate::error::LookupError;
    use crate::feeds::tests::{FakeFeeds, articles};
    use crate::models::{FactCheckAnnotation, Language};
    use chrono::TimeZone;
    use reqwest::StatusCode;
    use std::collections::HashMap;

    /// Answers by title; titles not listed have no match.
    struct TitleLookup(HashMap<String, Result<FactCheckAnnotation, StatusCode>>);

    impl ClaimLookup for TitleLookup {
        async fn lookup(
            &self,
            query: &str,
            _language: Language,
        ) -> Result<Option<FactCheckAnnotation>, LookupError> {
            match self.0.get(query) {
                Some(Ok(annotation)) => Ok(Some(annotation.clone())),
                Some(Err(status)) => Err(LookupError::Status(*status)),
                None => Ok(None),
            }
        }
    }

    fn config(dir: &std::path::Path) -> Config {
        Config {
            results_dir: dir.to_path_buf(),
            ..Config::default()
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 6, 14, 30, 0).unwrap()
    }

    fn read_latest(latest: &LatestPointer) -> ResultSet {
        serde_json::from_slice(&std::fs::read(&latest.paths().json).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_german_down_english_up() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());
        let feeds = FakeFeeds::default()
            .with_language(Language::German, Err(StatusCode::SERVICE_UNAVAILABLE))
            .with_language(Language::English, Ok(articles("en", 25, Language::English)));
        let mut latest = LatestPointer::new(tmp.path());

        let summary = run(&config, &feeds, None::<&TitleLookup>, at(), &mut latest)
            .await
            .unwrap();

        assert_eq!(summary.articles, 25);
        assert_eq!(summary.annotated, 0);
        let written = read_latest(&latest);
        assert_eq!(written.count, 25);
        assert!(written.articles.iter().all(|a| a.fact_check.is_none()));
        assert_eq!(
            std::fs::read(&summary.archive_json).unwrap(),
            std::fs::read(&latest.paths().json).unwrap()
        );
    }

    #[tokio::test]
    async fn test_total_feed_failure_writes_empty_set() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());
        let feeds = FakeFeeds::default()
            .with_language(Language::German, Err(StatusCode::BAD_GATEWAY))
            .with_language(Language::English, Err(StatusCode::BAD_GATEWAY));
        let mut latest = LatestPointer::new(tmp.path());

        let summary = run(&config, &feeds, None::<&TitleLookup>, at(), &mut latest)
            .await
            .unwrap();

        assert_eq!(summary.articles, 0);
        let written = read_latest(&latest);
        assert!(written.articles.is_empty());
        assert_eq!(written.generated_at, at());
    }

    #[tokio::test]
    async fn test_annotation_and_risk_are_attached() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());
        let mut german = articles("de", 4, Language::German);
        german[2].source = "breitbart.com".to_string();
        german[3].source = "de.rt.com".to_string();
        let feeds = FakeFeeds::default().with_language(Language::German, Ok(german));
        let lookup = TitleLookup(HashMap::from([
            (
                "de headline 0".to_string(),
                Ok(FactCheckAnnotation {
                    claim_text: "Claim".to_string(),
                    rating: "Falsch".to_string(),
                    reviewer: "Correctiv".to_string(),
                    review_url: "https://correctiv.org/1".to_string(),
                }),
            ),
            ("de headline 1".to_string(), Err(StatusCode::FORBIDDEN)),
            ("de headline 3".to_string(), Err(StatusCode::SERVICE_UNAVAILABLE)),
        ]));
        let mut latest = LatestPointer::new(tmp.path());

        let summary = run(&config, &feeds, Some(&lookup), at(), &mut latest)
            .await
            .unwrap();

        assert_eq!(summary.annotated, 1);
        assert_eq!(summary.failed_lookups, 2);
        assert_eq!(summary.transient_failures, 1);
        assert_eq!(summary.medium_risk, 2);
        assert_eq!(summary.low_risk, 2);

        let written = read_latest(&latest);
        assert_eq!(written.articles[0].fact_check.as_ref().unwrap().rating, "Falsch");
        assert_eq!(written.articles[0].risk.score, 0.5);
        assert!(written.articles[1].fact_check.is_none());
        assert_eq!(written.articles[2].risk.source_category, Some(DomainCategory::Biased));
        assert_eq!(written.articles[2].risk.score, 0.25);
        assert_eq!(written.articles[3].risk.source_category, Some(DomainCategory::StateMedia));
        assert_eq!(written.articles[3].risk.category, RiskCategory::Medium);
    }

    #[tokio::test]
    async fn test_output_respects_cap_and_uniqueness() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            max_articles: 5,
            ..config(tmp.path())
        };
        let mut english = articles("en", 8, Language::English);
        english[0].url = "https://de.example/1".to_string();
        let feeds = FakeFeeds::default()
            .with_language(Language::German, Ok(articles("de", 3, Language::German)))
            .with_language(Language::English, Ok(english));
        let mut latest = LatestPointer::new(tmp.path());

        run(&config, &feeds, None::<&TitleLookup>, at(), &mut latest)
            .await
            .unwrap();

        let written = read_latest(&latest);
        assert_eq!(written.count, 5);
        let mut urls = written.articles.iter().map(|a| a.url.clone()).collect::<Vec<_>>();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), 5);
    }

    #[tokio::test]
    async fn test_rerun_in_same_minute_keeps_both_archives() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config(tmp.path());
        let mut latest = LatestPointer::new(tmp.path());

        let first_feeds = FakeFeeds::default()
            .with_language(Language::English, Ok(articles("en", 2, Language::English)));
        let first = run(&config, &first_feeds, None::<&TitleLookup>, at(), &mut latest)
            .await
            .unwrap();
        let second_feeds = FakeFeeds::default()
            .with_language(Language::English, Ok(articles("en", 5, Language::English)));
        let second = run(&config, &second_feeds, None::<&TitleLookup>, at(), &mut latest)
            .await
            .unwrap();

        assert_ne!(first.archive_json, second.archive_json);
        let archived_first: ResultSet =
            serde_json::from_slice(&std::fs::read(&first.archive_json).unwrap()).unwrap();
        assert_eq!(archived_first.count, 2);
        assert_eq!(read_latest(&latest).count, 5);
    }

    #[tokio::test]
    async fn test_unwritable_results_dir_fails_run() {
        let tmp = tempfile::tempdir().unwrap();
        let blocked = tmp.path().join("results");
        std::fs::write(&blocked, "a file, not a directory").unwrap();
        let config = config(&blocked);
        let feeds = FakeFeeds::default()
            .with_language(Language::English, Ok(articles("en", 2, Language::English)));
        let mut latest = LatestPointer::new(&blocked);

        let res = run(&config, &feeds, None::<&TitleLookup>, at(), &mut latest).await;

        assert!(res.is_err());
    }
}
