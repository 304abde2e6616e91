//! The per-item fix collaborator for apply passes.
//!
//! One call per item. The apply loop classifies outcomes by matching the
//! closed [`FixError`] set; it never inspects messages or status fields
//! to decide what happened.

use async_trait::async_trait;
use fixline_core::playbook::Playbook;
use fixline_db::models::draft::DraftItem;
use fixline_db::repositories::ProductRepo;
use sqlx::PgPool;

use crate::quota::TokenBudget;

/// Outcome of one per-item fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    /// The field was written.
    Updated { field: String },
    /// Nothing to do; the item no longer needs the fix.
    Skipped,
}

/// Failure kinds a fixer may report.
#[derive(Debug, thiserror::Error)]
pub enum FixError {
    /// Transient throttling; retried a bounded number of times.
    #[error("Fix rate limited")]
    RateLimited,
    /// Today's allowance ran out at this item.
    #[error("Daily limit reached")]
    DailyLimitReached,
    /// Anything else; stops the pass.
    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait ProductFixer: Send + Sync {
    /// Apply one draft item to the catalog.
    async fn fix(
        &self,
        pool: &PgPool,
        budget: &TokenBudget,
        item: &DraftItem,
        playbook: Playbook,
    ) -> Result<FixOutcome, FixError>;
}

/// Default fixer: writes the drafted value straight to the products table.
///
/// The eligibility predicate is re-checked inside the UPDATE itself, so an
/// item someone filled mid-pass comes back as `Skipped` instead of being
/// overwritten.
pub struct CatalogFixer;

#[async_trait]
impl ProductFixer for CatalogFixer {
    async fn fix(
        &self,
        pool: &PgPool,
        budget: &TokenBudget,
        item: &DraftItem,
        playbook: Playbook,
    ) -> Result<FixOutcome, FixError> {
        let tokens = playbook.tokens_per_item();
        if !budget.can_spend(tokens).await {
            return Err(FixError::DailyLimitReached);
        }

        let updated = ProductRepo::set_field(pool, item.product_id, playbook, &item.proposed_value)
            .await
            .map_err(|e| FixError::Other(e.to_string()))?;

        if updated {
            budget.spend(tokens).await;
            Ok(FixOutcome::Updated {
                field: playbook.target_field().to_string(),
            })
        } else {
            Ok(FixOutcome::Skipped)
        }
    }
}
