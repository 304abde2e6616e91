//! Run processor: claims QUEUED runs and drives them to a terminal state.
//!
//! The claim is a compare-and-transition against the runs table and is
//! the sole guard against double-delivery: a run that is not QUEUED
//! belongs to someone else (or already finished) and is silently skipped.
//! Terminal state is always recorded before the error is re-raised, so
//! the delivery layer's retry policy never duplicates business
//! transitions.

use std::sync::Arc;

use fixline_core::approval::apply_resource_id;
use fixline_core::error::CoreError;
use fixline_core::playbook::Playbook;
use fixline_core::types::DbId;
use fixline_db::models::run::PlaybookRun;
use fixline_db::models::status::RunType;
use fixline_db::repositories::RunRepo;
use fixline_events::{names, DomainEvent, EventBus};
use sqlx::PgPool;

use crate::apply::ApplyExecutor;
use crate::draft::DraftService;
use crate::error::EngineError;
use crate::fixer::{CatalogFixer, ProductFixer};
use crate::generator::{ContentGenerator, TemplateContentProvider};

/// What a successful dispatch hands back for the terminal update.
struct Completion {
    draft_id: Option<DbId>,
    result: Option<serde_json::Value>,
    result_ref: Option<String>,
}

pub struct RunProcessor {
    pool: PgPool,
    bus: Arc<EventBus>,
    drafts: DraftService,
    apply: ApplyExecutor,
}

impl RunProcessor {
    /// Processor with the default template provider and catalog fixer.
    pub fn new(pool: PgPool, bus: Arc<EventBus>) -> Self {
        Self::with_collaborators(
            pool,
            bus,
            Arc::new(TemplateContentProvider),
            Arc::new(CatalogFixer),
        )
    }

    /// Processor with injected collaborators.
    pub fn with_collaborators(
        pool: PgPool,
        bus: Arc<EventBus>,
        generator: Arc<dyn ContentGenerator>,
        fixer: Arc<dyn ProductFixer>,
    ) -> Self {
        Self {
            drafts: DraftService::new(pool.clone(), bus.clone(), generator),
            apply: ApplyExecutor::new(pool.clone(), bus.clone(), fixer),
            pool,
            bus,
        }
    }

    /// Claim and execute one run by id.
    pub async fn process(&self, run_id: DbId) -> Result<(), EngineError> {
        match RunRepo::claim(&self.pool, run_id).await? {
            Some(run) => self.run_claimed(run).await,
            None => {
                tracing::debug!(run_id, "Run not claimable, skipping");
                Ok(())
            }
        }
    }

    /// Execute a run that was already transitioned to RUNNING.
    pub async fn run_claimed(&self, run: PlaybookRun) -> Result<(), EngineError> {
        tracing::info!(
            run_id = run.id,
            project_id = run.project_id,
            playbook = %run.playbook_key,
            run_type_id = run.run_type_id,
            "Processing run"
        );
        self.bus.publish(
            DomainEvent::new(names::RUN_STARTED)
                .with_source("playbook_run", run.id)
                .with_actor(run.created_by)
                .with_payload(serde_json::json!({
                    "project_id": run.project_id,
                    "playbook": run.playbook_key,
                })),
        );

        // Apply is never billed as an AI action, success or failure; the
        // generation run types always are.
        let ai_used = matches!(
            RunType::from_id(run.run_type_id),
            Some(RunType::PreviewGenerate | RunType::DraftGenerate)
        );

        match self.dispatch(&run).await {
            Ok(completion) => {
                RunRepo::mark_succeeded(
                    &self.pool,
                    run.id,
                    completion.draft_id,
                    completion.result.as_ref(),
                    completion.result_ref.as_deref(),
                    ai_used,
                )
                .await?;
                self.bus.publish(
                    DomainEvent::new(names::RUN_SUCCEEDED)
                        .with_source("playbook_run", run.id)
                        .with_actor(run.created_by)
                        .with_payload(serde_json::json!({
                            "project_id": run.project_id,
                            "playbook": run.playbook_key,
                            "result_ref": completion.result_ref,
                        })),
                );
                tracing::info!(run_id = run.id, "Run succeeded");
                Ok(())
            }
            Err(err) => {
                let code = err.error_code();
                let message = err.to_string();
                let event = if code.is_contract_violation() {
                    RunRepo::mark_stale(&self.pool, run.id, code.as_str(), &message, ai_used)
                        .await?;
                    tracing::warn!(run_id = run.id, error_code = %code, "Run went stale");
                    names::RUN_STALE
                } else {
                    RunRepo::mark_failed(&self.pool, run.id, code.as_str(), &message, ai_used)
                        .await?;
                    tracing::error!(run_id = run.id, error_code = %code, error = %message, "Run failed");
                    names::RUN_FAILED
                };
                self.bus.publish(
                    DomainEvent::new(event)
                        .with_source("playbook_run", run.id)
                        .with_actor(run.created_by)
                        .with_payload(serde_json::json!({
                            "project_id": run.project_id,
                            "playbook": run.playbook_key,
                            "error_code": code.as_str(),
                        })),
                );
                Err(err)
            }
        }
    }

    async fn dispatch(&self, run: &PlaybookRun) -> Result<Completion, EngineError> {
        let run_type = RunType::from_id(run.run_type_id).ok_or_else(|| {
            CoreError::Internal(format!("unknown run type id {}", run.run_type_id))
        })?;
        let playbook = Playbook::parse(&run.playbook_key)?;

        match run_type {
            RunType::PreviewGenerate => {
                let draft = self.drafts.generate_preview(run, playbook).await?;
                Ok(Completion {
                    result: Some(serde_json::json!({
                        "draft_id": draft.id,
                        "sample_count": draft.draft_generated,
                        "total_affected": draft.affected_total,
                        "scope_hash": draft.scope_hash,
                        "rules_hash": draft.rules_hash,
                    })),
                    result_ref: Some(draft.id.to_string()),
                    draft_id: Some(draft.id),
                })
            }
            RunType::DraftGenerate => {
                let draft = self.drafts.generate_full(run, playbook).await?;
                Ok(Completion {
                    result: Some(serde_json::json!({
                        "draft_id": draft.id,
                        "item_count": draft.draft_generated,
                        "total_affected": draft.affected_total,
                        "scope_hash": draft.scope_hash,
                        "rules_hash": draft.rules_hash,
                    })),
                    result_ref: Some(draft.id.to_string()),
                    draft_id: Some(draft.id),
                })
            }
            RunType::Apply => {
                let report = self.apply.execute(run, playbook).await?;
                let result = serde_json::to_value(&report)
                    .map_err(|e| CoreError::Internal(e.to_string()))?;
                Ok(Completion {
                    draft_id: None,
                    result: Some(result),
                    result_ref: run
                        .scope_hash
                        .as_deref()
                        .map(|scope| apply_resource_id(playbook, scope)),
                })
            }
        }
    }
}
