//! Source reputation by publishing domain.
//!
//! A static table of known misinformation outlets, grouped in categories and
//! checked in precedence order: the first category with a matching entry
//! wins, so a domain listed both as fake and as satire counts as fake.
//!
//! | Category | Risk boost |
//! |----------|-----------:|
//! | fake, hate | 0.60 |
//! | conspiracy, state media | 0.50 |
//! | junk science | 0.35 |
//! | unreliable | 0.30 |
//! | biased, aggregator | 0.25 |
//! | clickbait | 0.20 |
//! | satire | 0.15 |
//!
//! Lists are compiled from OpenSources, Media Bias/Fact Check and the
//! NELA-GT dataset.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reputation class of a publishing domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainCategory {
    /// Fabricated content.
    Fake,
    /// Hate speech or extremism.
    Hate,
    Conspiracy,
    /// State-controlled outlets.
    StateMedia,
    /// Pseudoscience.
    JunkScience,
    /// Poor sourcing.
    Unreliable,
    /// Extreme partisan bias.
    Biased,
    /// Republishes without an own newsroom.
    Aggregator,
    Clickbait,
    /// Satire, often shared as fact.
    Satire,
}

impl DomainCategory {
    /// Amount added to an article's risk score.
    pub fn boost(self) -> f64 {
        match self {
            DomainCategory::Fake | DomainCategory::Hate => 0.6,
            DomainCategory::Conspiracy | DomainCategory::StateMedia => 0.5,
            DomainCategory::JunkScience => 0.35,
            DomainCategory::Unreliable => 0.3,
            DomainCategory::Biased | DomainCategory::Aggregator => 0.25,
            DomainCategory::Clickbait => 0.2,
            DomainCategory::Satire => 0.15,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DomainCategory::Fake => "fake",
            DomainCategory::Hate => "hate",
            DomainCategory::Conspiracy => "conspiracy",
            DomainCategory::StateMedia => "state_media",
            DomainCategory::JunkScience => "junk_science",
            DomainCategory::Unreliable => "unreliable",
            DomainCategory::Biased => "biased",
            DomainCategory::Aggregator => "aggregator",
            DomainCategory::Clickbait => "clickbait",
            DomainCategory::Satire => "satire",
        }
    }
}

impl fmt::Display for DomainCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const FAKE: &[&str] = &[
    "abcnews.com.co",
    "beforeitsnews.com",
    "civictribune.com",
    "denverguardian.com",
    "empirenews.net",
    "huzlers.com",
    "nationalreport.net",
    "newsexaminer.net",
    "newsbiscuit.com",
    "now8news.com",
    "prntly.com",
    "react365.com",
    "realorsatire.com",
    "thebostontribune.com",
    "thelastlineofdefense.org",
    "tmzhiphop.com",
    "usatoday.com.co",
    "uspoln.com",
    "worldnewsdailyreport.com",
    "yournewswire.com",
    "newspunch.com",
    "neonnettle.com",
    "awarenessact.com",
    "dailyworldupdate.com",
];

const HATE: &[&str] = &[
    "dailystormer.su",
    "vdare.com",
    "amren.com",
    "stormfront.org",
    "jihadwatch.org",
    "barenakedislam.com",
    "pamelageller.com",
];

const CONSPIRACY: &[&str] = &[
    "infowars.com",
    "prisonplanet.com",
    "naturalnews.com",
    "globalresearch.ca",
    "activistpost.com",
    "collectiveevolution.com",
    "davidicke.com",
    "disclose.tv",
    "rense.com",
    "whatdoesitmean.com",
    "abovetopsecret.com",
    "vigilantcitizen.com",
    "zerohedge.com",
    "thefreethoughtproject.com",
    "intellihub.com",
    "newstarget.com",
    "humansarefree.com",
    "theeventchronicle.com",
    "stillnessinthestorm.com",
];

const STATE_MEDIA: &[&str] = &[
    "rt.com",
    "sputniknews.com",
    "tass.com",
    "ria.ru",
    "xinhuanet.com",
    "globaltimes.cn",
    "presstv.ir",
    "telesurtv.net",
    "almasdarnews.com",
    "southfront.org",
    "strategic-culture.org",
    "journal-neo.org",
    "veteranstoday.com",
];

const JUNK_SCIENCE: &[&str] = &[
    "naturalnews.com",
    "greenmedinfo.com",
    "mercola.com",
    "healthnutnews.com",
    "wakingtimes.com",
    "collective-evolution.com",
    "thehealthyhomeeconomist.com",
    "foodbabe.com",
    "realfarmacy.com",
    "preventdisease.com",
    "healthimpactnews.com",
];

const UNRELIABLE: &[&str] = &[
    "bipartisanreport.com",
    "dailywire.com",
    "thegatewaypundit.com",
    "100percentfedup.com",
    "addictinginfo.com",
    "americannews.com",
    "conservativetribune.com",
    "dailycaller.com",
    "dcgazette.com",
    "endingthefed.com",
    "freedomdaily.com",
    "libertywriters.com",
    "madworldnews.com",
    "occupydemocrats.com",
    "palmerreport.com",
    "politicususa.com",
    "redstatewatcher.com",
    "rightwingnews.com",
    "usapoliticstoday.com",
    "westernjournalism.com",
    "youngcons.com",
];

const BIASED: &[&str] = &[
    "breitbart.com",
    "dailykos.com",
    "theblaze.com",
    "townhall.com",
    "redstate.com",
    "pjmedia.com",
    "hotair.com",
    "americanthinker.com",
    "frontpagemag.com",
    "wnd.com",
    "newsmax.com",
    "oann.com",
    "thefederalist.com",
    "twitchy.com",
    "ijr.com",
    "commondreams.org",
    "alternet.org",
    "truthout.org",
    "rawstory.com",
    "crooksandliars.com",
];

const AGGREGATOR: &[&str] = &[
    "bignewsnetwork.com",
    "northkoreatimes.com",
    "koaborea.com",
    "maborea.com",
    "newkerala.com",
    "menafn.com",
    "timesnewswire.com",
    "webindia123.com",
    "thestatesman.net",
    "morningstaronline.co.uk",
];

const CLICKBAIT: &[&str] = &[
    "buzzfeed.com",
    "viralnova.com",
    "distractify.com",
    "upworthy.com",
    "hefty.co",
    "dailybuzzlive.com",
    "boredomtherapy.com",
    "faithit.com",
    "shareably.net",
    "inspiremore.com",
];

const SATIRE: &[&str] = &[
    "theonion.com",
    "clickhole.com",
    "babylonbee.com",
    "borowitz-report.com",
    "dailycurrant.com",
    "duffelblog.com",
    "empiresports.co",
    "faking-news.com",
    "gomerblog.com",
    "huzlers.com",
    "nationalreport.net",
    "newsthump.com",
    "private-eye.co.uk",
    "reductress.com",
    "rockcitytimes.com",
    "satirewire.com",
    "thelapine.ca",
    "waterfordwhispersnews.com",
];

/// Categories in precedence order.
const TABLE: [(DomainCategory, &[&str]); 10] = [
    (DomainCategory::Fake, FAKE),
    (DomainCategory::Hate, HATE),
    (DomainCategory::Conspiracy, CONSPIRACY),
    (DomainCategory::StateMedia, STATE_MEDIA),
    (DomainCategory::JunkScience, JUNK_SCIENCE),
    (DomainCategory::Unreliable, UNRELIABLE),
    (DomainCategory::Biased, BIASED),
    (DomainCategory::Aggregator, AGGREGATOR),
    (DomainCategory::Clickbait, CLICKBAIT),
    (DomainCategory::Satire, SATIRE),
];

/// Classify a publishing domain.
///
/// `extra_unreliable` holds operator-configured domains; they are checked
/// first and always classify as [`DomainCategory::Unreliable`]. An entry
/// matches the domain itself and any of its subdomains, so `rt.com` matches
/// `de.rt.com` but not `smart.com`.
///
/// # Returns
///
/// The first matching category, or `None` for unknown domains.
pub fn classify(domain: &str, extra_unreliable: &[String]) -> Option<DomainCategory> {
    let domain = domain.trim().trim_end_matches('.').to_lowercase();
    let domain = domain.strip_prefix("www.").unwrap_or(&domain);
    if domain.is_empty() {
        return None;
    }

    if extra_unreliable.iter().any(|entry| matches_entry(domain, entry)) {
        return Some(DomainCategory::Unreliable);
    }
    TABLE
        .iter()
        .find(|(_, entries)| entries.iter().any(|entry| matches_entry(domain, entry)))
        .map(|(category, _)| *category)
}

fn matches_entry(domain: &str, entry: &str) -> bool {
    let entry = entry.trim().to_lowercase();
    if entry.is_empty() {
        return false;
    }
    domain == entry
        || domain
            .strip_suffix(entry.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn none() -> Vec<String> {
        Vec::new()
    }

    #[test]
    fn test_each_tier() {
        let cases = [
            ("worldnewsdailyreport.com", DomainCategory::Fake, 0.6),
            ("stormfront.org", DomainCategory::Hate, 0.6),
            ("infowars.com", DomainCategory::Conspiracy, 0.5),
            ("rt.com", DomainCategory::StateMedia, 0.5),
            ("mercola.com", DomainCategory::JunkScience, 0.35),
            ("thegatewaypundit.com", DomainCategory::Unreliable, 0.3),
            ("breitbart.com", DomainCategory::Biased, 0.25),
            ("menafn.com", DomainCategory::Aggregator, 0.25),
            ("buzzfeed.com", DomainCategory::Clickbait, 0.2),
            ("theonion.com", DomainCategory::Satire, 0.15),
        ];
        for (domain, category, boost) in cases {
            assert_eq!(classify(domain, &none()), Some(category), "{domain}");
            assert_eq!(category.boost(), boost);
        }
    }

    #[test]
    fn test_first_category_wins() {
        // Listed as fake and as satire.
        assert_eq!(classify("huzlers.com", &none()), Some(DomainCategory::Fake));
        // Listed as conspiracy and as junk science.
        assert_eq!(classify("naturalnews.com", &none()), Some(DomainCategory::Conspiracy));
    }

    #[test]
    fn test_subdomains_match_on_label_boundary() {
        assert_eq!(classify("de.rt.com", &none()), Some(DomainCategory::StateMedia));
        assert_eq!(classify("www.Breitbart.com", &none()), Some(DomainCategory::Biased));
        assert_eq!(classify("smart.com", &none()), None);
        assert_eq!(classify("spiegel.de", &none()), None);
        assert_eq!(classify("", &none()), None);
    }

    #[test]
    fn test_configured_domains_take_precedence() {
        let extra = vec!["rumours.example".to_string(), "rt.com".to_string(), " ".to_string()];
        assert_eq!(classify("news.rumours.example", &extra), Some(DomainCategory::Unreliable));
        assert_eq!(classify("rt.com", &extra), Some(DomainCategory::Unreliable));
        assert_eq!(classify("tagesschau.de", &extra), None);
    }

    #[test]
    fn test_serializes_snake_case() {
        let json = serde_json::to_string(&DomainCategory::StateMedia).unwrap();
        assert_eq!(json, "\"state_media\"");
        assert_eq!(DomainCategory::JunkScience.to_string(), "junk_science");
    }
}
