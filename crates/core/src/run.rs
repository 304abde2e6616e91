//! Run failure classification.
//!
//! Every failed or stale run records one of these codes in
//! `playbook_runs.error_code`. The code alone decides the terminal status:
//! contract violations go STALE ("redo preview/draft"), everything else goes
//! FAILED. The processor never re-inspects error messages to classify.

use serde::{Deserialize, Serialize};

/// Classification code for a run that did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The scope hash the run was bound to no longer matches the catalog.
    ScopeInvalid,
    /// Playbook rule parameters changed after the draft was generated.
    RulesChanged,
    /// The draft the run depends on does not exist (or was expired).
    DraftNotFound,
    /// A plan or daily quota refused the operation.
    QuotaExceeded,
    /// The project requires a second-party approval that does not exist.
    ApprovalRequired,
    /// The content provider throttled us past the retry budget.
    RateLimited,
    /// The content provider failed outright.
    ProviderFailed,
    /// A database operation failed.
    Database,
    /// Anything else.
    Internal,
}

impl ErrorCode {
    /// Stable string form stored in `playbook_runs.error_code`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScopeInvalid => "scope_invalid",
            Self::RulesChanged => "rules_changed",
            Self::DraftNotFound => "draft_not_found",
            Self::QuotaExceeded => "quota_exceeded",
            Self::ApprovalRequired => "approval_required",
            Self::RateLimited => "rate_limited",
            Self::ProviderFailed => "provider_failed",
            Self::Database => "database",
            Self::Internal => "internal",
        }
    }

    /// Contract violations mark the run STALE instead of FAILED: the
    /// preview/draft the run was bound to can never become valid again,
    /// so retrying the same run record is pointless.
    pub fn is_contract_violation(self) -> bool {
        matches!(
            self,
            Self::ScopeInvalid | Self::RulesChanged | Self::DraftNotFound
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
