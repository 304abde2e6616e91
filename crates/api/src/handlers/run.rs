//! Handlers for triggering, listing, and inspecting playbook runs, and
//! the synchronous apply endpoint.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use fixline_core::error::CoreError;
use fixline_core::playbook::Playbook;
use fixline_core::types::DbId;
use fixline_db::models::run::{RunListQuery, TriggerRun};
use fixline_db::models::status::RunType;
use fixline_db::repositories::RunRepo;
use fixline_events::{names, DomainEvent};

use crate::error::{AppError, AppResult};
use crate::handlers::access::{project_access, ProjectAccess};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types and helpers
// ---------------------------------------------------------------------------

/// Request body for the synchronous apply endpoint.
#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    /// The scope hash from the estimate or draft the caller is acting on.
    pub scope_hash: String,
}

/// Parse the wire form of a run type.
fn parse_run_type(raw: &str) -> AppResult<RunType> {
    match raw {
        "preview_generate" => Ok(RunType::PreviewGenerate),
        "draft_generate" => Ok(RunType::DraftGenerate),
        "apply" => Ok(RunType::Apply),
        other => Err(AppError::Core(CoreError::Validation(format!(
            "Unknown run type '{other}'"
        )))),
    }
}

/// Reject callers whose role cannot trigger the given run type.
fn check_trigger_capability(access: &ProjectAccess, run_type: RunType) -> AppResult<()> {
    let allowed = match run_type {
        RunType::Apply => access.capabilities.can_apply,
        RunType::PreviewGenerate | RunType::DraftGenerate => {
            access.capabilities.can_generate_drafts
        }
    };
    if allowed {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(format!(
            "Role '{}' cannot trigger {} runs",
            access.role,
            run_type_key(run_type)
        ))))
    }
}

fn run_type_key(run_type: RunType) -> &'static str {
    match run_type {
        RunType::PreviewGenerate => "preview_generate",
        RunType::DraftGenerate => "draft_generate",
        RunType::Apply => "apply",
    }
}

// ---------------------------------------------------------------------------
// POST /projects/{project_id}/playbooks/{playbook}/runs -- trigger a run
// ---------------------------------------------------------------------------

/// Enqueue a run for the worker to pick up.
///
/// The idempotency key dedupes re-submissions: a key that was already
/// used returns the original run with 200 instead of creating a new one.
pub async fn trigger_run(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, playbook_key)): Path<(DbId, String)>,
    Json(input): Json<TriggerRun>,
) -> AppResult<impl IntoResponse> {
    let access = project_access(&state.pool, project_id, auth.user_id).await?;
    let playbook = Playbook::parse(&playbook_key)?;
    let run_type = parse_run_type(&input.run_type)?;
    check_trigger_capability(&access, run_type)?;

    if input.idempotency_key.is_empty() {
        return Err(AppError::BadRequest(
            "idempotency_key must not be empty".into(),
        ));
    }

    if let Some(existing) =
        RunRepo::find_by_idempotency_key(&state.pool, project_id, &input.idempotency_key).await?
    {
        return Ok((StatusCode::OK, DataResponse::new(existing)));
    }

    let run = RunRepo::create_idempotent(
        &state.pool,
        project_id,
        auth.user_id,
        playbook.key(),
        run_type,
        input.scope_hash.as_deref(),
        input.rules_hash.as_deref(),
        &input.idempotency_key,
    )
    .await?;

    state.event_bus.publish(
        DomainEvent::new(names::RUN_QUEUED)
            .with_source("playbook_run", run.id)
            .with_actor(auth.user_id)
            .with_payload(json!({
                "playbook": playbook.key(),
                "run_type": input.run_type,
            })),
    );

    tracing::info!(
        user_id = auth.user_id,
        project_id,
        run_id = run.id,
        playbook = playbook.key(),
        run_type = %input.run_type,
        "Run queued"
    );

    Ok((StatusCode::CREATED, DataResponse::new(run)))
}

// ---------------------------------------------------------------------------
// GET /projects/{project_id}/playbooks/{playbook}/runs -- run history
// ---------------------------------------------------------------------------

pub async fn list_runs(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, playbook_key)): Path<(DbId, String)>,
    Query(mut params): Query<RunListQuery>,
) -> AppResult<impl IntoResponse> {
    project_access(&state.pool, project_id, auth.user_id).await?;
    let playbook = Playbook::parse(&playbook_key)?;

    // The path names the playbook; it wins over any query filter.
    params.playbook = Some(playbook.key().to_string());
    let runs = RunRepo::list_for_project(&state.pool, project_id, &params).await?;

    Ok(DataResponse::new(runs))
}

// ---------------------------------------------------------------------------
// GET /runs/{run_id} -- run inspection
// ---------------------------------------------------------------------------

pub async fn get_run(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(run_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let run = RunRepo::find_by_id(&state.pool, run_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "playbook_run",
            id: run_id,
        }))?;
    project_access(&state.pool, run.project_id, auth.user_id).await?;

    Ok(DataResponse::new(run))
}

// ---------------------------------------------------------------------------
// POST /projects/{project_id}/playbooks/{playbook}/apply -- synchronous apply
// ---------------------------------------------------------------------------

/// Run a full apply pass inline and return the finished run.
///
/// The caller binds the pass to the scope hash from their estimate; rules
/// are bound to their current value at submission. Gate refusals come
/// back as HTTP errors (409 with both hashes on scope drift, 429 on
/// quota, 403 when an approval is missing) after the run has already
/// recorded its terminal state.
pub async fn apply_playbook(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, playbook_key)): Path<(DbId, String)>,
    Json(input): Json<ApplyRequest>,
) -> AppResult<impl IntoResponse> {
    let access = project_access(&state.pool, project_id, auth.user_id).await?;
    let playbook = Playbook::parse(&playbook_key)?;

    if !access.capabilities.can_apply {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Role '{}' cannot apply playbooks",
            access.role
        ))));
    }
    if input.scope_hash.is_empty() {
        return Err(AppError::BadRequest("scope_hash must not be empty".into()));
    }

    let rules = fixline_engine::scope::ScopeResolver::resolve_rules(
        &state.pool,
        project_id,
        playbook,
    )
    .await
    .map_err(AppError::from)?;

    // Each call is its own pass; idempotent re-submission is the trigger
    // endpoint's job.
    let idempotency_key = uuid::Uuid::new_v4().to_string();
    let run = RunRepo::create_idempotent(
        &state.pool,
        project_id,
        auth.user_id,
        playbook.key(),
        RunType::Apply,
        Some(&input.scope_hash),
        Some(&rules.rules_hash),
        &idempotency_key,
    )
    .await?;

    state.event_bus.publish(
        DomainEvent::new(names::RUN_QUEUED)
            .with_source("playbook_run", run.id)
            .with_actor(auth.user_id)
            .with_payload(json!({
                "playbook": playbook.key(),
                "run_type": "apply",
            })),
    );

    // The terminal state is recorded before the error propagates, so a
    // refused pass still leaves an inspectable run row behind.
    state
        .processor
        .process(run.id)
        .await
        .map_err(AppError::from)?;

    let finished = RunRepo::find_by_id(&state.pool, run.id)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(format!("Run {} missing after apply pass", run.id))
        })?;

    tracing::info!(
        user_id = auth.user_id,
        project_id,
        run_id = finished.id,
        playbook = playbook.key(),
        "Apply pass finished"
    );

    Ok(DataResponse::new(finished))
}
