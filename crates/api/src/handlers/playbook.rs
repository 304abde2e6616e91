//! Handlers for the playbook registry, estimates, and settings.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use fixline_core::error::CoreError;
use fixline_core::playbook::{Playbook, ALL_PLAYBOOKS};
use fixline_core::types::DbId;
use fixline_db::models::playbook_setting::UpsertPlaybookSetting;
use fixline_db::repositories::PlaybookSettingRepo;
use fixline_engine::estimate::EstimateService;
use fixline_engine::scope::ScopeResolver;

use crate::error::{AppError, AppResult};
use crate::handlers::access::project_access;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One registry entry with its live scope counts.
#[derive(Debug, Serialize)]
pub struct PlaybookOverview {
    pub key: &'static str,
    pub label: &'static str,
    pub target_field: &'static str,
    pub tokens_per_item: i64,
    /// Products currently matching the playbook predicate.
    pub affected_count: i64,
    pub scope_hash: String,
}

/// Current configuration of one playbook on one project.
#[derive(Debug, Serialize)]
pub struct PlaybookSettingsView {
    pub playbook: &'static str,
    pub params: serde_json::Value,
    pub rules_hash: String,
}

// ---------------------------------------------------------------------------
// GET /projects/{project_id}/playbooks -- registry with live counts
// ---------------------------------------------------------------------------

pub async fn list_playbooks(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    project_access(&state.pool, project_id, auth.user_id).await?;

    let mut entries = Vec::with_capacity(ALL_PLAYBOOKS.len());
    for &playbook in ALL_PLAYBOOKS {
        let scope = ScopeResolver::resolve(&state.pool, project_id, playbook)
            .await
            .map_err(AppError::from)?;
        entries.push(PlaybookOverview {
            key: playbook.key(),
            label: playbook.label(),
            target_field: playbook.target_field(),
            tokens_per_item: playbook.tokens_per_item(),
            affected_count: scope.total_affected,
            scope_hash: scope.scope_hash,
        });
    }

    Ok(DataResponse::new(entries))
}

// ---------------------------------------------------------------------------
// GET /projects/{project_id}/playbooks/{playbook}/estimate
// ---------------------------------------------------------------------------

/// Read-only preflight: scope size, projected cost, quota headroom, and
/// the binding hashes. Never errors for "nothing to do"; refusals come
/// back as structured reasons.
pub async fn get_estimate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, playbook_key)): Path<(DbId, String)>,
) -> AppResult<impl IntoResponse> {
    project_access(&state.pool, project_id, auth.user_id).await?;
    let playbook = Playbook::parse(&playbook_key)?;

    let estimate = EstimateService::estimate(&state.pool, project_id, playbook)
        .await
        .map_err(AppError::from)?;

    Ok(DataResponse::new(estimate))
}

// ---------------------------------------------------------------------------
// GET /projects/{project_id}/playbooks/{playbook}/settings
// ---------------------------------------------------------------------------

pub async fn get_settings(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, playbook_key)): Path<(DbId, String)>,
) -> AppResult<impl IntoResponse> {
    project_access(&state.pool, project_id, auth.user_id).await?;
    let playbook = Playbook::parse(&playbook_key)?;

    // Unconfigured playbooks resolve to the empty object, same as the
    // rules-hash fingerprint does.
    let rules = ScopeResolver::resolve_rules(&state.pool, project_id, playbook)
        .await
        .map_err(AppError::from)?;

    Ok(DataResponse::new(PlaybookSettingsView {
        playbook: playbook.key(),
        params: rules.params,
        rules_hash: rules.rules_hash,
    }))
}

// ---------------------------------------------------------------------------
// PUT /projects/{project_id}/playbooks/{playbook}/settings
// ---------------------------------------------------------------------------

/// Replace the rule parameters for one playbook. Changing the params
/// changes the rules hash, which invalidates runs and drafts bound to the
/// old one.
pub async fn put_settings(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((project_id, playbook_key)): Path<(DbId, String)>,
    Json(input): Json<UpsertPlaybookSetting>,
) -> AppResult<impl IntoResponse> {
    let access = project_access(&state.pool, project_id, auth.user_id).await?;
    let playbook = Playbook::parse(&playbook_key)?;

    if !access.capabilities.can_generate_drafts {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Role '{}' cannot configure playbooks",
            access.role
        ))));
    }
    if !input.params.is_object() {
        return Err(AppError::BadRequest("params must be a JSON object".into()));
    }

    let setting =
        PlaybookSettingRepo::upsert(&state.pool, project_id, playbook.key(), &input.params)
            .await?;
    let rules_hash = fixline_core::scope::rules_hash(&setting.params);

    tracing::info!(
        user_id = auth.user_id,
        project_id,
        playbook = playbook.key(),
        "Playbook settings updated"
    );

    Ok(DataResponse::new(PlaybookSettingsView {
        playbook: playbook.key(),
        params: setting.params,
        rules_hash,
    }))
}
