//! Heuristic misinformation risk of an article.
//!
//! Signals are added up and clamped to `[0, 1]`:
//!
//! | Signal | Weight |
//! |--------|--------|
//! | Fact-check verdict says false or misleading | +0.5 |
//! | Fact-check verdict says true | -0.2 |
//! | Publishing domain has a bad reputation | +0.15 to +0.6, see [`crate::domains`] |
//! | Absolutist wording in the title | +0.1 |
//!
//! Scores of 0.7 and above are `HIGH`, 0.4 and above `MEDIUM`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domains;
use crate::models::{Article, FactCheckAnnotation, RiskAssessment, RiskCategory};

const FALSE_MARKERS: [&str; 8] = [
    "falsch",
    "false",
    "untrue",
    "unwahr",
    "pants on fire",
    "unbelegt",
    "irreführend",
    "misleading",
];
const TRUE_MARKERS: [&str; 4] = ["wahr", "true", "correct", "richtig"];

pub const HIGH_RISK_THRESHOLD: f64 = 0.7;
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.4;

static ABSOLUTIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:immer|nie|alle|keine|jeder|niemand|garantiert)\b|100\s?%")
        .expect("static regex")
});

/// Score an article from its verdict, domain and title.
///
/// `unreliable_domains` are operator-configured additions to the built-in
/// domain table.
pub fn assess(
    article: &Article,
    fact_check: Option<&FactCheckAnnotation>,
    unreliable_domains: &[String],
) -> RiskAssessment {
    let mut score: f64 = 0.0;

    if let Some(annotation) = fact_check {
        let rating = annotation.rating.to_lowercase();
        if FALSE_MARKERS.iter().any(|m| rating.contains(m)) {
            score += 0.5;
        } else if TRUE_MARKERS.iter().any(|m| rating.contains(m)) {
            score -= 0.2;
        }
    }

    let source_category = domains::classify(&article.source, unreliable_domains);
    if let Some(category) = source_category {
        score += category.boost();
    }

    if ABSOLUTIST.is_match(&article.title) {
        score += 0.1;
    }

    let score = (score.clamp(0.0, 1.0) * 100.0).round() / 100.0;
    RiskAssessment {
        score,
        category: categorize(score),
        source_category,
    }
}

/// Map a score to its category using the HIGH/MEDIUM thresholds.
pub fn categorize(score: f64) -> RiskCategory {
    if score >= HIGH_RISK_THRESHOLD {
        RiskCategory::High
    } else if score >= MEDIUM_RISK_THRESHOLD {
        RiskCategory::Medium
    } else {
        RiskCategory::Low
    }
}
