//! Plan catalog, quota math, and the playbook estimate.
//!
//! Plans are code, not rows: the billing system (external) only tells us a
//! plan id per user, and the allowances for each id are versioned with the
//! code that enforces them.

use serde::{Deserialize, Serialize};

use crate::playbook::Playbook;

// ---------------------------------------------------------------------------
// Plan catalog
// ---------------------------------------------------------------------------

/// Subscription plan tier, as reported by the billing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanId {
    Free,
    Starter,
    Pro,
    Scale,
}

impl PlanId {
    /// Parse the TEXT plan column. Unknown plan ids read as `Free`:
    /// a billing hiccup must fail closed, never grant quota.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "starter" => Self::Starter,
            "pro" => Self::Pro,
            "scale" => Self::Scale,
            _ => Self::Free,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Starter => "starter",
            Self::Pro => "pro",
            Self::Scale => "scale",
        }
    }

    /// The allowances for this plan.
    pub fn quotas(self) -> PlanQuotas {
        match self {
            Self::Free => PlanQuotas {
                bulk_automations_enabled: false,
                daily_ai_actions: 5,
                daily_token_budget: 2_000,
            },
            Self::Starter => PlanQuotas {
                bulk_automations_enabled: true,
                daily_ai_actions: 25,
                daily_token_budget: 25_000,
            },
            Self::Pro => PlanQuotas {
                bulk_automations_enabled: true,
                daily_ai_actions: 100,
                daily_token_budget: 150_000,
            },
            Self::Scale => PlanQuotas {
                bulk_automations_enabled: true,
                daily_ai_actions: 1_000,
                daily_token_budget: 2_000_000,
            },
        }
    }
}

/// Per-plan allowances. Daily windows reset at UTC midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanQuotas {
    /// Whether bulk playbook automation is available at all. The free tier
    /// is categorically blocked from bulk apply, independent of quota.
    pub bulk_automations_enabled: bool,
    /// Item-level AI calls allowed per day.
    pub daily_ai_actions: i64,
    /// Provider tokens allowed per day.
    pub daily_token_budget: i64,
}

// ---------------------------------------------------------------------------
// Usage snapshot
// ---------------------------------------------------------------------------

/// Today's recorded usage for a billing principal, read from the
/// `ai_usage_events` ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageToday {
    /// Item-level AI calls recorded since UTC midnight.
    pub actions: i64,
    /// Tokens recorded since UTC midnight.
    pub tokens: i64,
}

/// Running tally of today's allowance across one apply pass.
///
/// Seeded from the ledger at pass start and advanced per updated item, so
/// the pass can stop at the exact item where the allowance runs out
/// without re-reading the ledger.
#[derive(Debug, Clone, Copy)]
pub struct QuotaTracker {
    quotas: PlanQuotas,
    actions_used: i64,
    tokens_used: i64,
}

impl QuotaTracker {
    pub fn new(plan: PlanId, usage: UsageToday) -> Self {
        Self {
            quotas: plan.quotas(),
            actions_used: usage.actions,
            tokens_used: usage.tokens,
        }
    }

    /// Whether one more item costing `tokens` fits today's allowance.
    pub fn can_spend(&self, tokens: i64) -> bool {
        self.actions_used < self.quotas.daily_ai_actions
            && self.tokens_used + tokens <= self.quotas.daily_token_budget
    }

    /// Count one item's spend against the allowance.
    pub fn spend(&mut self, tokens: i64) {
        self.actions_used += 1;
        self.tokens_used += tokens;
    }
}

// ---------------------------------------------------------------------------
// Estimate
// ---------------------------------------------------------------------------

/// Blocking reason vocabulary for an estimate. Fixed set; the UI keys
/// copy off these strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateReason {
    PlanNotEligible,
    NoAffectedProducts,
    AiDailyLimitReached,
    TokenCapWouldBeExceeded,
}

/// Result of a playbook estimate: affected count, projected cost, quota
/// headroom, and whether the caller may proceed to draft/apply.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybookEstimate {
    pub playbook: Playbook,
    pub plan: PlanId,
    pub total_affected_products: i64,
    pub projected_tokens: i64,
    pub daily_actions_limit: i64,
    pub daily_actions_used: i64,
    pub daily_token_budget: i64,
    pub daily_tokens_used: i64,
    /// Fingerprint of the eligible item set; binds later runs to this
    /// exact catalog state.
    pub scope_hash: String,
    /// Fingerprint of the current rule parameters.
    pub rules_hash: String,
    pub eligible: bool,
    pub can_proceed: bool,
    pub reasons: Vec<EstimateReason>,
}

/// Assemble an estimate from resolved scope and quota inputs. Pure; the
/// I/O (scope resolution, ledger read) happens in `fixline-engine`.
pub fn assemble_estimate(
    playbook: Playbook,
    plan: PlanId,
    usage: UsageToday,
    total_affected_products: i64,
    scope_hash: String,
    rules_hash: String,
) -> PlaybookEstimate {
    let quotas = plan.quotas();
    let projected_tokens = total_affected_products * playbook.tokens_per_item();
    let remaining_actions = quotas.daily_ai_actions - usage.actions;
    let remaining_tokens = quotas.daily_token_budget - usage.tokens;

    let mut reasons = Vec::new();
    if !quotas.bulk_automations_enabled {
        reasons.push(EstimateReason::PlanNotEligible);
    }
    if total_affected_products == 0 {
        reasons.push(EstimateReason::NoAffectedProducts);
    }
    if remaining_actions <= 0 {
        reasons.push(EstimateReason::AiDailyLimitReached);
    }
    if projected_tokens > remaining_tokens {
        reasons.push(EstimateReason::TokenCapWouldBeExceeded);
    }

    let eligible = quotas.bulk_automations_enabled
        && total_affected_products > 0
        && remaining_actions > 0
        && projected_tokens <= remaining_tokens;

    PlaybookEstimate {
        playbook,
        plan,
        total_affected_products,
        projected_tokens,
        daily_actions_limit: quotas.daily_ai_actions,
        daily_actions_used: usage.actions,
        daily_token_budget: quotas.daily_token_budget,
        daily_tokens_used: usage.tokens,
        scope_hash,
        rules_hash,
        eligible,
        can_proceed: eligible && reasons.is_empty(),
        reasons,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
