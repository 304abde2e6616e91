//! Quota gate: plan lookup and daily-usage reads for a project's billing
//! principal.
//!
//! The billing principal is always the project owner. Member activity
//! draws from the owner's allowance, and the owner's plan decides what is
//! available at all.

use fixline_core::error::CoreError;
use fixline_core::plan::{PlanId, QuotaTracker, UsageToday};
use fixline_core::types::DbId;
use fixline_db::models::project::Project;
use fixline_db::repositories::{UsageRepo, UserRepo};
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::error::EngineError;

/// Ledger action for apply passes; one row per updated item.
pub const ACTION_APPLY: &str = "playbook_apply";
/// Ledger action for preview generation; one row per run.
pub const ACTION_PREVIEW: &str = "preview_generate";
/// Ledger action for full draft generation; one row per run.
pub const ACTION_DRAFT: &str = "draft_generate";

/// Plan and today's usage for a project's owner.
#[derive(Debug, Clone, Copy)]
pub struct QuotaContext {
    pub owner_id: DbId,
    pub plan: PlanId,
    pub usage: UsageToday,
}

pub struct QuotaGate;

impl QuotaGate {
    /// Load the owner's plan and today's ledger reads for `action`.
    pub async fn context(
        pool: &PgPool,
        project: &Project,
        action: &str,
    ) -> Result<QuotaContext, EngineError> {
        let owner = UserRepo::find_by_id(pool, project.owner_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "user",
                id: project.owner_id,
            })?;
        let usage = UsageRepo::daily_usage(pool, owner.id, action).await?;
        Ok(QuotaContext {
            owner_id: owner.id,
            plan: PlanId::parse(&owner.plan),
            usage,
        })
    }
}

/// Shared daily-allowance ledger handed to the per-item fixer during an
/// apply pass.
///
/// The fixer, not the loop, decides when the allowance is exhausted; the
/// loop only classifies the outcome. An apply pass is single-threaded, so
/// check-then-spend through the mutex never races with itself.
pub struct TokenBudget {
    inner: Mutex<QuotaTracker>,
}

impl TokenBudget {
    pub fn new(tracker: QuotaTracker) -> Self {
        Self {
            inner: Mutex::new(tracker),
        }
    }

    /// Whether one more item costing `tokens` fits today's allowance.
    pub async fn can_spend(&self, tokens: i64) -> bool {
        self.inner.lock().await.can_spend(tokens)
    }

    /// Count one item against the allowance.
    pub async fn spend(&self, tokens: i64) {
        self.inner.lock().await.spend(tokens);
    }
}
