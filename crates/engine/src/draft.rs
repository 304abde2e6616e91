//! Preview and full draft generation.
//!
//! Both paths share one pipeline: resolve scope and rules, sweep stale
//! drafts, create a PARTIAL draft, generate item content, then promote.
//! A preview stops after [`PREVIEW_SAMPLE_SIZE`] items and stays PARTIAL,
//! existing only to show the caller what the provider would write.

use std::sync::Arc;

use fixline_core::error::CoreError;
use fixline_core::playbook::{Playbook, PREVIEW_SAMPLE_SIZE};
use fixline_core::run::ErrorCode;
use fixline_db::models::draft::{Draft, NewDraft};
use fixline_db::models::run::PlaybookRun;
use fixline_db::models::status::DraftStatus;
use fixline_db::repositories::{DraftRepo, ProductRepo, ProjectRepo, RunRepo, UsageRepo};
use fixline_events::{names, DomainEvent, EventBus};
use sqlx::PgPool;

use crate::error::EngineError;
use crate::generator::ContentGenerator;
use crate::quota::{QuotaGate, ACTION_DRAFT, ACTION_PREVIEW};
use crate::scope::ScopeResolver;

pub struct DraftService {
    pool: PgPool,
    bus: Arc<EventBus>,
    generator: Arc<dyn ContentGenerator>,
}

impl DraftService {
    pub fn new(pool: PgPool, bus: Arc<EventBus>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            pool,
            bus,
            generator,
        }
    }

    /// Generate a sample draft for the current scope. The draft stays
    /// PARTIAL.
    pub async fn generate_preview(
        &self,
        run: &PlaybookRun,
        playbook: Playbook,
    ) -> Result<Draft, EngineError> {
        self.generate(run, playbook, Some(PREVIEW_SAMPLE_SIZE)).await
    }

    /// Generate the full draft for the current scope and promote it READY.
    pub async fn generate_full(
        &self,
        run: &PlaybookRun,
        playbook: Playbook,
    ) -> Result<Draft, EngineError> {
        self.generate(run, playbook, None).await
    }

    async fn generate(
        &self,
        run: &PlaybookRun,
        playbook: Playbook,
        sample: Option<usize>,
    ) -> Result<Draft, EngineError> {
        let pool = &self.pool;
        let scope = ScopeResolver::resolve(pool, run.project_id, playbook).await?;
        let rules = ScopeResolver::resolve_rules(pool, run.project_id, playbook).await?;

        // A run bound to hashes at trigger time must still match the live
        // catalog when it finally executes.
        if let Some(bound) = run.scope_hash.as_deref() {
            if bound != scope.scope_hash {
                return Err(CoreError::ScopeConflict {
                    expected: bound.to_string(),
                    actual: scope.scope_hash,
                }
                .into());
            }
        }
        if let Some(bound) = run.rules_hash.as_deref() {
            if bound != rules.rules_hash {
                return Err(CoreError::Contract {
                    code: ErrorCode::RulesChanged,
                    message: "rule parameters changed since this run was triggered".into(),
                }
                .into());
            }
        }

        let project = ProjectRepo::find_by_id(pool, run.project_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "project",
                id: run.project_id,
            })?;
        let action = if sample.is_some() {
            ACTION_PREVIEW
        } else {
            ACTION_DRAFT
        };
        let ctx = QuotaGate::context(pool, &project, action).await?;
        let quotas = ctx.plan.quotas();

        if sample.is_none() && !quotas.bulk_automations_enabled {
            return Err(CoreError::QuotaExceeded {
                reason: format!(
                    "plan {} does not include bulk automations",
                    ctx.plan.as_str()
                ),
            }
            .into());
        }

        let take = match sample {
            Some(n) => n.min(scope.product_ids.len()),
            None => scope.product_ids.len(),
        };
        let cost = take as i64 * playbook.tokens_per_item();
        if take > 0 {
            if ctx.usage.actions >= quotas.daily_ai_actions {
                return Err(CoreError::QuotaExceeded {
                    reason: "daily AI action limit reached".into(),
                }
                .into());
            }
            if ctx.usage.tokens + cost > quotas.daily_token_budget {
                return Err(CoreError::QuotaExceeded {
                    reason: "daily token budget would be exceeded".into(),
                }
                .into());
            }
        }

        // Drafts bound to a hash pair that no longer matches are dead; sweep
        // them before creating the replacement.
        let expired = DraftRepo::expire_mismatched(
            pool,
            run.project_id,
            playbook.key(),
            &scope.scope_hash,
            &rules.rules_hash,
        )
        .await?;
        if expired > 0 {
            tracing::debug!(
                project_id = run.project_id,
                playbook = playbook.key(),
                expired,
                "Expired drafts with mismatched bindings"
            );
        }

        let draft = DraftRepo::create(
            pool,
            &NewDraft {
                project_id: run.project_id,
                playbook_key: playbook.key().to_string(),
                scope_hash: scope.scope_hash.clone(),
                rules_hash: rules.rules_hash.clone(),
                params: rules.params.clone(),
                affected_total: scope.total_affected,
                generated_by: Some(run.created_by),
            },
        )
        .await?;
        // Link immediately so a mid-generation failure still points at the
        // partial draft.
        RunRepo::set_draft_id(pool, run.id, draft.id).await?;
        self.bus.publish(
            DomainEvent::new(names::DRAFT_CREATED)
                .with_source("draft", draft.id)
                .with_actor(run.created_by)
                .with_payload(serde_json::json!({
                    "project_id": run.project_id,
                    "playbook": playbook.key(),
                    "sample": sample.is_some(),
                    "affected_total": scope.total_affected,
                })),
        );

        let products = ProductRepo::scope_products(pool, run.project_id, playbook).await?;
        let field = playbook.target_field();
        for product in products.iter().take(take) {
            let value = match self.generator.generate(product, playbook, &rules.params).await {
                Ok(value) => value,
                Err(err) => {
                    DraftRepo::set_status(pool, draft.id, DraftStatus::Failed).await?;
                    return Err(err.into());
                }
            };
            DraftRepo::add_item(
                pool,
                draft.id,
                product.id,
                field,
                &value,
                product.field_value(field),
            )
            .await?;
        }

        if take > 0 {
            UsageRepo::record(
                pool,
                ctx.owner_id,
                run.project_id,
                action,
                cost,
                Some(run.id),
                None,
            )
            .await?;
        }

        if sample.is_none() {
            DraftRepo::set_status(pool, draft.id, DraftStatus::Ready).await?;
            self.bus.publish(
                DomainEvent::new(names::DRAFT_READY)
                    .with_source("draft", draft.id)
                    .with_actor(run.created_by)
                    .with_payload(serde_json::json!({
                        "project_id": run.project_id,
                        "playbook": playbook.key(),
                        "item_count": take,
                    })),
            );
        }

        // Re-read so the returned row carries the final status and the
        // item counter maintained by add_item.
        DraftRepo::find_by_id(pool, draft.id)
            .await?
            .ok_or_else(|| {
                CoreError::Internal(format!("draft {} vanished during generation", draft.id))
                    .into()
            })
    }
}
