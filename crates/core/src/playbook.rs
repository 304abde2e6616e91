//! The static playbook registry.
//!
//! A playbook is a named bulk-fix rule over the product catalog. The set is
//! closed: adding a playbook means adding a variant here, a target column
//! in the product scope queries, and (optionally) template copy in the
//! default content provider. Keys are stored as TEXT in
//! `playbook_runs.playbook_key` and `drafts.playbook_key`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::issue::ActionKey;

/// Number of items a PREVIEW_GENERATE run generates content for.
pub const PREVIEW_SAMPLE_SIZE: usize = 3;

/// A bulk-fix rule applied across the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Playbook {
    /// Fill the `title` field where it is missing or blank.
    FillMissingTitles,
    /// Fill the `description` field where it is missing or blank.
    FillMissingDescriptions,
    /// Fill the `seo_description` field where it is missing or blank.
    FillMissingSeo,
}

/// All registered playbooks, in registry order.
pub const ALL_PLAYBOOKS: &[Playbook] = &[
    Playbook::FillMissingTitles,
    Playbook::FillMissingDescriptions,
    Playbook::FillMissingSeo,
];

impl Playbook {
    /// Stable key stored in the database and used in URLs.
    pub fn key(self) -> &'static str {
        match self {
            Self::FillMissingTitles => "fill-missing-titles",
            Self::FillMissingDescriptions => "fill-missing-descriptions",
            Self::FillMissingSeo => "fill-missing-seo",
        }
    }

    /// Parse a playbook key. Unknown keys are a validation error.
    pub fn parse(key: &str) -> Result<Self, CoreError> {
        ALL_PLAYBOOKS
            .iter()
            .copied()
            .find(|p| p.key() == key)
            .ok_or_else(|| CoreError::Validation(format!("Unknown playbook '{key}'")))
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::FillMissingTitles => "Fill missing titles",
            Self::FillMissingDescriptions => "Fill missing descriptions",
            Self::FillMissingSeo => "Fill missing SEO descriptions",
        }
    }

    /// The product column this playbook writes.
    pub fn target_field(self) -> &'static str {
        match self {
            Self::FillMissingTitles => "title",
            Self::FillMissingDescriptions => "description",
            Self::FillMissingSeo => "seo_description",
        }
    }

    /// Projected generation cost per product, in provider tokens.
    /// Used by the estimate and charged per UPDATED item at apply time.
    pub fn tokens_per_item(self) -> i64 {
        match self {
            Self::FillMissingTitles => 120,
            Self::FillMissingDescriptions => 420,
            Self::FillMissingSeo => 260,
        }
    }

    /// The work-queue action category this playbook remedies.
    pub fn action_key(self) -> ActionKey {
        match self {
            Self::FillMissingTitles => ActionKey::MissingTitles,
            Self::FillMissingDescriptions => ActionKey::MissingDescriptions,
            Self::FillMissingSeo => ActionKey::MissingSeo,
        }
    }
}

impl std::fmt::Display for Playbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
