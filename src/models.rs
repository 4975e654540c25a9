//! Data models shared by every pipeline stage.
//!
//! - [`Language`]: GDELT source languages, one variant per `sourcelang:` value
//! - [`Article`]: one candidate news article, optionally carrying a verdict
//! - [`FactCheckAnnotation`]: a human-reviewed verdict matched to an article
//! - [`RiskAssessment`]: the heuristic misinformation risk of an article
//! - [`ResultSet`]: one run's output, persisted to archive and latest files

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;

use crate::domains::DomainCategory;

macro_rules! gdelt_languages {
    ($($variant:ident => ($name:literal, $iso:literal)),+ $(,)?) => {
        /// A source language recognized by the GDELT DOC API.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Language {
            $($variant),+
        }

        impl Language {
            /// Every language GDELT's `sourcelang:` operator accepts.
            pub const ALL: &'static [Language] = &[$(Language::$variant),+];

            /// Value of the `sourcelang:` operator in a GDELT query.
            pub fn gdelt_name(self) -> &'static str {
                match self {
                    $(Language::$variant => $name),+
                }
            }

            /// ISO 639-1 code, sent to the fact-check API as `languageCode`.
            pub fn iso_code(self) -> &'static str {
                match self {
                    $(Language::$variant => $iso),+
                }
            }
        }
    };
}

gdelt_languages! {
    Afrikaans => ("afrikaans", "af"),
    Albanian => ("albanian", "sq"),
    Arabic => ("arabic", "ar"),
    Armenian => ("armenian", "hy"),
    Azerbaijani => ("azerbaijani", "az"),
    Basque => ("basque", "eu"),
    Belarusian => ("belarusian", "be"),
    Bengali => ("bengali", "bn"),
    Bosnian => ("bosnian", "bs"),
    Bulgarian => ("bulgarian", "bg"),
    Catalan => ("catalan", "ca"),
    Chinese => ("chinese", "zh"),
    Croatian => ("croatian", "hr"),
    Czech => ("czech", "cs"),
    Danish => ("danish", "da"),
    Dutch => ("dutch", "nl"),
    English => ("english", "en"),
    Estonian => ("estonian", "et"),
    Finnish => ("finnish", "fi"),
    French => ("french", "fr"),
    Galician => ("galician", "gl"),
    Georgian => ("georgian", "ka"),
    German => ("german", "de"),
    Greek => ("greek", "el"),
    Gujarati => ("gujarati", "gu"),
    Hebrew => ("hebrew", "he"),
    Hindi => ("hindi", "hi"),
    Hungarian => ("hungarian", "hu"),
    Icelandic => ("icelandic", "is"),
    Indonesian => ("indonesian", "id"),
    Italian => ("italian", "it"),
    Japanese => ("japanese", "ja"),
    Kannada => ("kannada", "kn"),
    Kazakh => ("kazakh", "kk"),
    Korean => ("korean", "ko"),
    Latvian => ("latvian", "lv"),
    Lithuanian => ("lithuanian", "lt"),
    Macedonian => ("macedonian", "mk"),
    Malay => ("malay", "ms"),
    Malayalam => ("malayalam", "ml"),
    Marathi => ("marathi", "mr"),
    Mongolian => ("mongolian", "mn"),
    Nepali => ("nepali", "ne"),
    Norwegian => ("norwegian", "no"),
    Persian => ("persian", "fa"),
    Polish => ("polish", "pl"),
    Portuguese => ("portuguese", "pt"),
    Punjabi => ("punjabi", "pa"),
    Romanian => ("romanian", "ro"),
    Russian => ("russian", "ru"),
    Serbian => ("serbian", "sr"),
    Sinhalese => ("sinhalese", "si"),
    Slovak => ("slovak", "sk"),
    Slovenian => ("slovenian", "sl"),
    Somali => ("somali", "so"),
    Spanish => ("spanish", "es"),
    Swahili => ("swahili", "sw"),
    Swedish => ("swedish", "sv"),
    Tamil => ("tamil", "ta"),
    Telugu => ("telugu", "te"),
    Thai => ("thai", "th"),
    Tibetan => ("tibetan", "bo"),
    Turkish => ("turkish", "tr"),
    Ukrainian => ("ukrainian", "uk"),
    Urdu => ("urdu", "ur"),
    Vietnamese => ("vietnamese", "vi"),
}

impl Language {
    /// Parse a configured tag, either the GDELT name (`german`) or the
    /// two-letter ISO code (`de`). Case and surrounding whitespace are ignored.
    pub fn from_tag(tag: &str) -> Option<Language> {
        let tag = tag.trim().to_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.gdelt_name() == tag || lang.iso_code() == tag)
    }

    /// Keywords selecting political and economic coverage.
    pub fn topic_query(self) -> &'static str {
        match self {
            Language::German => "politik OR regierung OR wirtschaft",
            _ => "politics OR government OR economy",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.gdelt_name())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.gdelt_name())
    }
}

/// Accepts the same tags as [`Language::from_tag`].
impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Language::from_tag(&tag)
            .ok_or_else(|| de::Error::custom(format!("unknown GDELT language `{tag}`")))
    }
}

/// A candidate news article.
///
/// `url` is the identity of an article within one run; the fetcher drops
/// later duplicates.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    /// Publishing domain, e.g. `spiegel.de`.
    pub source: String,
    pub publish_time: Option<DateTime<Utc>>,
    pub language: Language,
    #[serde(default)]
    pub fact_check: Option<FactCheckAnnotation>,
    #[serde(default)]
    pub risk: RiskAssessment,
}

impl Article {
    /// A freshly fetched article: no verdict yet, risk not scored.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        publish_time: Option<DateTime<Utc>>,
        language: Language,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            source: source.into(),
            publish_time,
            language,
            fact_check: None,
            risk: RiskAssessment::default(),
        }
    }
}

/// A published fact-check matched to an article's title.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FactCheckAnnotation {
    /// The claim as phrased by the fact-checker.
    pub claim_text: String,
    /// Free-text verdict, e.g. "False" or "Irreführend".
    pub rating: String,
    /// Publisher of the review.
    pub reviewer: String,
    pub review_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskCategory {
    #[default]
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskCategory::Low => "LOW",
            RiskCategory::Medium => "MEDIUM",
            RiskCategory::High => "HIGH",
        })
    }
}

/// Heuristic misinformation risk of an article.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct RiskAssessment {
    /// In `[0, 1]`, rounded to two decimals.
    pub score: f64,
    pub category: RiskCategory,
    /// Reputation class of the publishing domain, `None` when unknown.
    #[serde(default)]
    pub source_category: Option<DomainCategory>,
}

/// The complete output of one run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResultSet {
    pub generated_at: DateTime<Utc>,
    pub count: usize,
    pub articles: Vec<Article>,
}

impl ResultSet {
    /// Build a result set holding at most `max_articles` articles, in order.
    pub fn new(generated_at: DateTime<Utc>, mut articles: Vec<Article>, max_articles: usize) -> Self {
        articles.truncate(max_articles);
        Self {
            generated_at,
            count: articles.len(),
            articles,
        }
    }

    pub fn count_by_risk(&self, category: RiskCategory) -> usize {
        self.articles
            .iter()
            .filter(|a| a.risk.category == category)
            .count()
    }

    pub fn annotated_count(&self) -> usize {
        self.articles.iter().filter(|a| a.fact_check.is_some()).count()
    }
}
