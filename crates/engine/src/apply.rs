//! The apply execution loop.
//!
//! Gate order is fixed: scope re-validation, plan gate, empty-scope
//! short-circuit, approval gate, draft lookup, then the bounded item
//! loop. Gate refusals return `Err` with nothing touched; once the loop
//! starts, every outcome lands in the report and the pass returns `Ok`,
//! stopped or not.

use std::sync::Arc;

use fixline_core::apply::{ApplyReport, RATE_LIMIT_MAX_RETRIES};
use fixline_core::approval::{apply_resource_id, RESOURCE_TYPE_PLAYBOOK_APPLY};
use fixline_core::error::CoreError;
use fixline_core::plan::QuotaTracker;
use fixline_core::playbook::Playbook;
use fixline_core::run::ErrorCode;
use fixline_db::models::run::PlaybookRun;
use fixline_db::repositories::{ApprovalRepo, DraftRepo, ExportRepo, ProjectRepo, UsageRepo};
use fixline_events::{names, DomainEvent, EventBus};
use sqlx::PgPool;

use crate::error::EngineError;
use crate::fixer::{FixError, FixOutcome, ProductFixer};
use crate::quota::{QuotaGate, TokenBudget, ACTION_APPLY};
use crate::scope::ScopeResolver;

pub struct ApplyExecutor {
    pool: PgPool,
    bus: Arc<EventBus>,
    fixer: Arc<dyn ProductFixer>,
}

impl ApplyExecutor {
    pub fn new(pool: PgPool, bus: Arc<EventBus>, fixer: Arc<dyn ProductFixer>) -> Self {
        Self { pool, bus, fixer }
    }

    /// Run one apply pass for a claimed APPLY run.
    pub async fn execute(
        &self,
        run: &PlaybookRun,
        playbook: Playbook,
    ) -> Result<ApplyReport, EngineError> {
        let pool = &self.pool;
        let bound_scope = run
            .scope_hash
            .as_deref()
            .ok_or_else(|| CoreError::Validation("apply run carries no scope hash".into()))?;
        let bound_rules = run
            .rules_hash
            .as_deref()
            .ok_or_else(|| CoreError::Validation("apply run carries no rules hash".into()))?;

        // The decision was made against the supplied hashes; the live
        // catalog and rules must still match them, or nothing happens.
        let scope = ScopeResolver::resolve(pool, run.project_id, playbook).await?;
        if scope.scope_hash != bound_scope {
            return Err(CoreError::ScopeConflict {
                expected: bound_scope.to_string(),
                actual: scope.scope_hash,
            }
            .into());
        }
        let rules = ScopeResolver::resolve_rules(pool, run.project_id, playbook).await?;
        if rules.rules_hash != bound_rules {
            return Err(CoreError::Contract {
                code: ErrorCode::RulesChanged,
                message: "rule parameters changed since the draft was generated".into(),
            }
            .into());
        }

        // The free tier never bulk-applies, independent of remaining quota.
        let project = ProjectRepo::find_by_id(pool, run.project_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "project",
                id: run.project_id,
            })?;
        let ctx = QuotaGate::context(pool, &project, ACTION_APPLY).await?;
        if !ctx.plan.quotas().bulk_automations_enabled {
            return Err(CoreError::QuotaExceeded {
                reason: format!(
                    "plan {} does not include bulk automations",
                    ctx.plan.as_str()
                ),
            }
            .into());
        }

        // Nothing eligible: report zeros without requiring a draft.
        if scope.total_affected == 0 {
            return Ok(ApplyReport::new(0));
        }

        // Governed projects need a valid second-party approval before any
        // item is touched.
        let resource_id = apply_resource_id(playbook, bound_scope);
        let approval = if project.require_approval {
            let approval = ApprovalRepo::find_valid(
                pool,
                run.project_id,
                RESOURCE_TYPE_PLAYBOOK_APPLY,
                &resource_id,
            )
            .await?
            .ok_or_else(|| CoreError::ApprovalRequired {
                resource_id: resource_id.clone(),
            })?;
            Some(approval)
        } else {
            None
        };

        let draft = DraftRepo::find_ready(
            pool,
            run.project_id,
            playbook.key(),
            bound_scope,
            bound_rules,
        )
        .await?
        .ok_or_else(|| CoreError::Contract {
            code: ErrorCode::DraftNotFound,
            message: "no ready draft for this scope and rules".into(),
        })?;

        let items = DraftRepo::items_for_draft(pool, draft.id).await?;
        let budget = TokenBudget::new(QuotaTracker::new(ctx.plan, ctx.usage));
        let tokens_per_item = playbook.tokens_per_item();
        let mut report = ApplyReport::new(scope.total_affected);

        'items: for item in &items {
            let mut retries = 0;
            loop {
                match self.fixer.fix(pool, &budget, item, playbook).await {
                    Ok(FixOutcome::Updated { field }) => {
                        // Usage is recorded per updated item and stays
                        // recorded even if the pass stops later.
                        UsageRepo::record(
                            pool,
                            ctx.owner_id,
                            run.project_id,
                            ACTION_APPLY,
                            tokens_per_item,
                            Some(run.id),
                            Some(item.product_id),
                        )
                        .await?;
                        DraftRepo::mark_item_applied(pool, item.id).await?;
                        report.record_updated(item.product_id, field);
                        break;
                    }
                    Ok(FixOutcome::Skipped) => {
                        report.record_skipped(item.product_id);
                        break;
                    }
                    Err(FixError::RateLimited) => {
                        if retries < RATE_LIMIT_MAX_RETRIES {
                            retries += 1;
                            continue;
                        }
                        report.stop_rate_limited(item.product_id);
                        break 'items;
                    }
                    Err(FixError::DailyLimitReached) => {
                        report.stop_limit_reached(item.product_id);
                        break 'items;
                    }
                    Err(FixError::Other(message)) => {
                        report.stop_failed(item.product_id, message);
                        break 'items;
                    }
                }
            }
        }

        // Updated rows make any previous export stale, stopped pass or not.
        if report.updated > 0 {
            ExportRepo::mark_stale(pool, run.project_id).await?;
        }

        // A clean pass consumes its approval and retires the draft. A
        // stopped pass leaves both: the catalog change it made will force a
        // fresh preview cycle, and the next pass binds a new resource id.
        if !report.stopped {
            if let Some(approval) = &approval {
                if ApprovalRepo::mark_consumed(pool, approval.id).await? {
                    self.bus.publish(
                        DomainEvent::new(names::APPROVAL_CONSUMED)
                            .with_source("approval_request", approval.id)
                            .with_actor(run.created_by)
                            .with_payload(serde_json::json!({
                                "project_id": run.project_id,
                                "resource_id": resource_id,
                            })),
                    );
                }
            }
            DraftRepo::mark_applied(pool, draft.id, run.created_by).await?;
            self.bus.publish(
                DomainEvent::new(names::PLAYBOOK_APPLIED)
                    .with_source("draft", draft.id)
                    .with_actor(run.created_by)
                    .with_payload(serde_json::json!({
                        "project_id": run.project_id,
                        "playbook": playbook.key(),
                        "updated": report.updated,
                        "skipped": report.skipped,
                    })),
            );
        }

        Ok(report)
    }
}
