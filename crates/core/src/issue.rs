//! Issue taxonomy: severities and the action categories the work queue
//! groups raw issues into.
//!
//! The crawler writes free-form category hints (`issues.category`), so the
//! grouping is an ordered rule list with an explicit `Other` default bucket:
//! every issue lands in exactly one category, no matter what the crawler
//! invents next.

use serde::{Deserialize, Serialize};

/// Severity of a raw issue, as written by the crawler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Info,
    Warning,
    Critical,
}

impl IssueSeverity {
    /// Parse the TEXT severity column. Unknown values under-report as
    /// `Info` rather than erroring.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "critical" => Self::Critical,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }
}

/// Fixed action categories the queue groups issues into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKey {
    MissingTitles,
    MissingDescriptions,
    MissingSeo,
    BrokenMedia,
    StaleContent,
    /// Default bucket for anything the rules below do not claim.
    Other,
}

/// Every action category, in impact order. The queue derivation iterates
/// this fixed list so grouping never depends on map iteration order.
pub const ALL_ACTION_KEYS: &[ActionKey] = &[
    ActionKey::MissingTitles,
    ActionKey::MissingSeo,
    ActionKey::MissingDescriptions,
    ActionKey::BrokenMedia,
    ActionKey::StaleContent,
    ActionKey::Other,
];

/// All action categories, in classification-priority order. The first rule
/// whose needle appears in the category hint wins; `Other` never matches by
/// rule and is the fallthrough.
const CLASSIFICATION_RULES: &[(ActionKey, &[&str])] = &[
    (ActionKey::MissingTitles, &["title"]),
    (ActionKey::MissingSeo, &["seo", "meta"]),
    (ActionKey::MissingDescriptions, &["description", "body"]),
    (ActionKey::BrokenMedia, &["image", "media", "video"]),
    (ActionKey::StaleContent, &["stale", "outdated", "sync"]),
];

impl ActionKey {
    /// Stable key used in bundle ids (`issues:{key}`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingTitles => "missing_titles",
            Self::MissingDescriptions => "missing_descriptions",
            Self::MissingSeo => "missing_seo",
            Self::BrokenMedia => "broken_media",
            Self::StaleContent => "stale_content",
            Self::Other => "other",
        }
    }

    /// Human-readable bundle title.
    pub fn label(self) -> &'static str {
        match self {
            Self::MissingTitles => "Missing titles",
            Self::MissingDescriptions => "Missing descriptions",
            Self::MissingSeo => "Missing SEO metadata",
            Self::BrokenMedia => "Broken media",
            Self::StaleContent => "Stale content",
            Self::Other => "Other issues",
        }
    }

    /// Static impact rank used as the third sort key in the work queue.
    /// Lower sorts first.
    pub fn impact_rank(self) -> u8 {
        match self {
            Self::MissingTitles => 0,
            Self::MissingSeo => 1,
            Self::MissingDescriptions => 2,
            Self::BrokenMedia => 3,
            Self::StaleContent => 4,
            Self::Other => 5,
        }
    }

    /// Classify a raw category hint into exactly one action category.
    pub fn classify(category: &str) -> ActionKey {
        let hint = category.to_ascii_lowercase();
        for (key, needles) in CLASSIFICATION_RULES {
            if needles.iter().any(|n| hint.contains(n)) {
                return *key;
            }
        }
        ActionKey::Other
    }
}

impl std::fmt::Display for ActionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_puts_critical_on_top() {
        assert!(IssueSeverity::Critical > IssueSeverity::Warning);
        assert!(IssueSeverity::Warning > IssueSeverity::Info);
    }

    #[test]
    fn severity_parse_is_total() {
        assert_eq!(IssueSeverity::parse("critical"), IssueSeverity::Critical);
        assert_eq!(IssueSeverity::parse("warning"), IssueSeverity::Warning);
        assert_eq!(IssueSeverity::parse("info"), IssueSeverity::Info);
        assert_eq!(IssueSeverity::parse("???"), IssueSeverity::Info);
        assert_eq!(IssueSeverity::parse(""), IssueSeverity::Info);
    }

    #[test]
    fn title_rule_wins_over_seo_rule() {
        // "seo_title_missing" names both; the title rule has priority.
        assert_eq!(
            ActionKey::classify("seo_title_missing"),
            ActionKey::MissingTitles
        );
    }

    #[test]
    fn classification_matches_known_hints() {
        assert_eq!(
            ActionKey::classify("missing_title"),
            ActionKey::MissingTitles
        );
        assert_eq!(
            ActionKey::classify("product.description.empty"),
            ActionKey::MissingDescriptions
        );
        assert_eq!(ActionKey::classify("meta_description"), ActionKey::MissingSeo);
        assert_eq!(ActionKey::classify("broken_image"), ActionKey::BrokenMedia);
        assert_eq!(ActionKey::classify("feed_out_of_sync"), ActionKey::StaleContent);
    }

    #[test]
    fn unknown_hints_land_in_the_default_bucket() {
        assert_eq!(ActionKey::classify("gremlins"), ActionKey::Other);
        assert_eq!(ActionKey::classify(""), ActionKey::Other);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(
            ActionKey::classify("Missing_TITLE"),
            ActionKey::MissingTitles
        );
    }

    #[test]
    fn impact_ranks_are_unique() {
        let mut ranks = [
            ActionKey::MissingTitles,
            ActionKey::MissingDescriptions,
            ActionKey::MissingSeo,
            ActionKey::BrokenMedia,
            ActionKey::StaleContent,
            ActionKey::Other,
        ]
        .map(ActionKey::impact_rank);
        ranks.sort_unstable();
        for pair in ranks.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }
}
