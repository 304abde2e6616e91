//! Scope resolution: the live eligible-item set and its binding hashes.
//!
//! A scope is never stored. It is recomputed from catalog state on every
//! read, and the hash is the only thing that ties an estimate, a draft,
//! and an apply together.

use fixline_core::playbook::Playbook;
use fixline_core::scope;
use fixline_core::types::DbId;
use fixline_db::repositories::{PlaybookSettingRepo, ProductRepo};
use sqlx::PgPool;

use crate::error::EngineError;

/// Snapshot of the current eligible set for one playbook.
#[derive(Debug, Clone)]
pub struct ResolvedScope {
    /// Eligible product ids in application order (most recently synced
    /// first).
    pub product_ids: Vec<DbId>,
    pub scope_hash: String,
    pub total_affected: i64,
}

/// Current rule parameters and their fingerprint.
#[derive(Debug, Clone)]
pub struct ResolvedRules {
    pub params: serde_json::Value,
    pub rules_hash: String,
}

pub struct ScopeResolver;

impl ScopeResolver {
    /// Recompute the eligible set from live catalog state and fingerprint
    /// it.
    pub async fn resolve(
        pool: &PgPool,
        project_id: DbId,
        playbook: Playbook,
    ) -> Result<ResolvedScope, EngineError> {
        let product_ids = ProductRepo::scope_ids(pool, project_id, playbook).await?;
        let scope_hash = scope::scope_hash(&product_ids);
        let total_affected = product_ids.len() as i64;
        Ok(ResolvedScope {
            product_ids,
            scope_hash,
            total_affected,
        })
    }

    /// Current rule parameters for a playbook on a project. Unconfigured
    /// playbooks hash as an empty object so the fingerprint is always
    /// defined.
    pub async fn resolve_rules(
        pool: &PgPool,
        project_id: DbId,
        playbook: Playbook,
    ) -> Result<ResolvedRules, EngineError> {
        let params = PlaybookSettingRepo::find(pool, project_id, playbook.key())
            .await?
            .map(|setting| setting.params)
            .unwrap_or_else(|| serde_json::json!({}));
        let rules_hash = scope::rules_hash(&params);
        Ok(ResolvedRules { params, rules_hash })
    }
}
