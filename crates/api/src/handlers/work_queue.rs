//! Handler for the unified work queue.
//!
//! The queue is a pure read-time projection. This handler gathers the
//! three raw signal streams (open issues, latest run/draft/approval per
//! playbook, export state) and hands them to the derivation in
//! `fixline_core::queue`, which owns grouping, state precedence,
//! filtering, and the total sort order.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use fixline_core::approval::{apply_resource_id, RESOURCE_TYPE_PLAYBOOK_APPLY};
use fixline_core::issue::IssueSeverity;
use fixline_core::playbook::ALL_PLAYBOOKS;
use fixline_core::queue::{
    derive_queue, ActionBundle, ApprovalPhase, ApprovalSnapshot, BundleType, DraftPhase,
    DraftSnapshot, ExportPhase, ExportSignal, IssueSignal, PlaybookSignal, QueueFilter, QueueTab,
    RunPhase, RunSnapshot, Viewer,
};
use fixline_core::types::DbId;
use fixline_db::models::approval::ApprovalRequest;
use fixline_db::models::draft::Draft;
use fixline_db::models::project::Project;
use fixline_db::models::run::PlaybookRun;
use fixline_db::models::status::{ApprovalStatus, DraftStatus, ExportStatus, RunStatus};
use fixline_db::repositories::{
    ApprovalRepo, DraftRepo, ExportRepo, IssueRepo, RunRepo,
};
use fixline_engine::quota::{QuotaGate, ACTION_APPLY};
use fixline_engine::scope::ScopeResolver;

use crate::error::{AppError, AppResult};
use crate::handlers::access::project_access;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /projects/{project_id}/work-queue`.
#[derive(Debug, Deserialize)]
pub struct WorkQueueParams {
    pub tab: Option<String>,
    pub bundle_type: Option<String>,
    pub bundle_id: Option<String>,
}

/// The derived queue plus the caller's capabilities, so the client can
/// decide which actions to offer without a second round trip.
#[derive(Debug, Serialize)]
pub struct WorkQueueView {
    pub viewer: Viewer,
    pub items: Vec<ActionBundle>,
}

// ---------------------------------------------------------------------------
// GET /projects/{project_id}/work-queue
// ---------------------------------------------------------------------------

pub async fn get_work_queue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<WorkQueueParams>,
) -> AppResult<impl IntoResponse> {
    let access = project_access(&state.pool, project_id, auth.user_id).await?;

    let filter = QueueFilter {
        tab: match &params.tab {
            Some(raw) => QueueTab::parse(raw)?,
            None => QueueTab::default(),
        },
        bundle_type: params
            .bundle_type
            .as_deref()
            .map(BundleType::parse)
            .transpose()?,
        bundle_id: params.bundle_id,
    };

    let issues = issue_signals(&state.pool, project_id).await?;
    let playbooks = playbook_signals(&state.pool, &access.project).await?;
    let export = export_signal(&state.pool, project_id).await?;

    let items = derive_queue(
        chrono::Utc::now(),
        &issues,
        &playbooks,
        Some(&export),
        &filter,
    );

    Ok(DataResponse::new(WorkQueueView {
        viewer: Viewer {
            role: access.role,
            capabilities: access.capabilities,
        },
        items,
    }))
}

// ---------------------------------------------------------------------------
// Signal assembly
// ---------------------------------------------------------------------------

async fn issue_signals(pool: &PgPool, project_id: DbId) -> AppResult<Vec<IssueSignal>> {
    let issues = IssueRepo::open_for_project(pool, project_id).await?;
    Ok(issues
        .into_iter()
        .map(|issue| IssueSignal {
            severity: IssueSeverity::parse(&issue.severity),
            category: issue.category,
            updated_at: issue.updated_at,
        })
        .collect())
}

/// One signal per registered playbook, each carrying its live scope count
/// plus the latest run, draft, and active approval.
async fn playbook_signals(
    pool: &PgPool,
    project: &Project,
) -> AppResult<Vec<PlaybookSignal>> {
    let ctx = QuotaGate::context(pool, project, ACTION_APPLY)
        .await
        .map_err(AppError::from)?;
    let plan_blocked = !ctx.plan.quotas().bulk_automations_enabled;

    let mut signals = Vec::with_capacity(ALL_PLAYBOOKS.len());
    for &playbook in ALL_PLAYBOOKS {
        let scope = ScopeResolver::resolve(pool, project.id, playbook)
            .await
            .map_err(AppError::from)?;

        let run = RunRepo::latest_for_playbook(pool, project.id, playbook.key())
            .await?
            .and_then(run_snapshot);
        let draft = DraftRepo::latest_for_playbook(pool, project.id, playbook.key())
            .await?
            .and_then(draft_snapshot);
        // An approval only counts while it still matches the live scope.
        let approval = ApprovalRepo::find_active(
            pool,
            project.id,
            RESOURCE_TYPE_PLAYBOOK_APPLY,
            &apply_resource_id(playbook, &scope.scope_hash),
        )
        .await?
        .and_then(approval_snapshot);
        let last_applied_at =
            RunRepo::last_apply_finished_at(pool, project.id, playbook.key()).await?;

        signals.push(PlaybookSignal {
            playbook,
            affected_count: scope.total_affected,
            run,
            draft,
            approval,
            plan_blocked,
            last_applied_at,
        });
    }
    Ok(signals)
}

async fn export_signal(pool: &PgPool, project_id: DbId) -> AppResult<ExportSignal> {
    Ok(match ExportRepo::find_for_project(pool, project_id).await? {
        Some(row) => ExportSignal {
            phase: match ExportStatus::from_id(row.status_id) {
                Some(ExportStatus::Exported) => ExportPhase::Exported,
                Some(ExportStatus::Stale) => ExportPhase::Stale,
                _ => ExportPhase::None,
            },
            product_count: row.product_count,
            updated_at: row.last_exported_at,
        },
        None => ExportSignal {
            phase: ExportPhase::None,
            product_count: 0,
            updated_at: None,
        },
    })
}

/// Rows with an unknown status id are skipped rather than guessed at.
fn run_snapshot(run: PlaybookRun) -> Option<RunSnapshot> {
    let phase = match RunStatus::from_id(run.status_id)? {
        RunStatus::Queued => RunPhase::Queued,
        RunStatus::Running => RunPhase::Running,
        RunStatus::Succeeded => RunPhase::Succeeded,
        RunStatus::Failed => RunPhase::Failed,
        RunStatus::Stale => RunPhase::Stale,
    };
    Some(RunSnapshot {
        phase,
        updated_at: run.updated_at,
    })
}

fn draft_snapshot(draft: Draft) -> Option<DraftSnapshot> {
    let phase = match DraftStatus::from_id(draft.status_id)? {
        DraftStatus::Partial => DraftPhase::Partial,
        DraftStatus::Ready => DraftPhase::Ready,
        DraftStatus::Failed => DraftPhase::Failed,
        DraftStatus::Expired => DraftPhase::Expired,
    };
    Some(DraftSnapshot {
        id: draft.id,
        phase,
        item_count: draft.draft_generated,
        updated_at: draft.updated_at,
    })
}

fn approval_snapshot(request: ApprovalRequest) -> Option<ApprovalSnapshot> {
    let phase = match ApprovalStatus::from_id(request.status_id)? {
        ApprovalStatus::PendingApproval => ApprovalPhase::Pending,
        ApprovalStatus::Approved => ApprovalPhase::Approved,
        ApprovalStatus::Rejected => return None,
    };
    Some(ApprovalSnapshot {
        id: request.id,
        phase,
        requested_by: request.requested_by,
        updated_at: request.updated_at,
    })
}
