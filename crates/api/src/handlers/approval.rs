//! Handlers for the approval request workflow.
//!
//! Requests bind to a composite resource id (`"{playbook_key}:{scope_hash}"`
//! for applies), so a granted approval stops matching the moment the
//! underlying product set drifts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use fixline_core::approval::RESOURCE_TYPE_PLAYBOOK_APPLY;
use fixline_core::error::CoreError;
use fixline_core::types::DbId;
use fixline_db::models::approval::{
    ApprovalListQuery, CreateApprovalRequest, RejectApprovalRequest,
};
use fixline_db::repositories::ApprovalRepo;
use fixline_events::{names, DomainEvent};

use crate::error::{AppError, AppResult};
use crate::handlers::access::project_access;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /projects/{project_id}/approvals -- list requests
// ---------------------------------------------------------------------------

pub async fn list_approvals(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<ApprovalListQuery>,
) -> AppResult<impl IntoResponse> {
    project_access(&state.pool, project_id, auth.user_id).await?;

    let requests =
        ApprovalRepo::list_for_project(&state.pool, project_id, params.status_id).await?;

    Ok(DataResponse::new(requests))
}

// ---------------------------------------------------------------------------
// POST /projects/{project_id}/approvals -- open a request
// ---------------------------------------------------------------------------

/// Open a PENDING_APPROVAL request for a resource.
///
/// At most one live (pending or approved, unconsumed) request may exist
/// per resource; a duplicate is a conflict. The partial unique index on
/// `approval_requests` backs this against concurrent creates.
pub async fn create_approval(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateApprovalRequest>,
) -> AppResult<impl IntoResponse> {
    let access = project_access(&state.pool, project_id, auth.user_id).await?;

    if !access.capabilities.can_request_approval {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Role '{}' cannot request approvals",
            access.role
        ))));
    }
    if input.resource_type != RESOURCE_TYPE_PLAYBOOK_APPLY {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown resource type '{}'",
            input.resource_type
        ))));
    }
    if input.resource_id.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "resource_id must not be empty".into(),
        )));
    }

    if ApprovalRepo::find_active(
        &state.pool,
        project_id,
        &input.resource_type,
        &input.resource_id,
    )
    .await?
    .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "An active approval request already exists for this resource".into(),
        )));
    }

    let request = ApprovalRepo::create(&state.pool, project_id, auth.user_id, &input).await?;

    state.event_bus.publish(
        DomainEvent::new(names::APPROVAL_REQUESTED)
            .with_source("approval_request", request.id)
            .with_actor(auth.user_id)
            .with_payload(json!({
                "resource_type": request.resource_type,
                "resource_id": request.resource_id,
            })),
    );

    tracing::info!(
        user_id = auth.user_id,
        project_id,
        approval_id = request.id,
        resource_id = %request.resource_id,
        "Approval requested"
    );

    Ok((StatusCode::CREATED, DataResponse::new(request)))
}

// ---------------------------------------------------------------------------
// POST /approvals/{id}/approve -- grant a pending request
// ---------------------------------------------------------------------------

/// Approve a pending request. Approving your own request is rejected:
/// the whole point of the gate is a second pair of eyes.
pub async fn approve_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = ApprovalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "approval_request",
            id,
        }))?;
    let access = project_access(&state.pool, request.project_id, auth.user_id).await?;

    if !access.capabilities.can_approve {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Role '{}' cannot decide approval requests",
            access.role
        ))));
    }
    if request.requested_by == auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You cannot approve your own request".into(),
        )));
    }

    let decided = ApprovalRepo::approve(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Request is not pending anymore".into(),
            ))
        })?;

    state.event_bus.publish(
        DomainEvent::new(names::APPROVAL_APPROVED)
            .with_source("approval_request", decided.id)
            .with_actor(auth.user_id)
            .with_payload(json!({ "resource_id": decided.resource_id })),
    );

    tracing::info!(
        user_id = auth.user_id,
        approval_id = decided.id,
        resource_id = %decided.resource_id,
        "Approval granted"
    );

    Ok(DataResponse::new(decided))
}

// ---------------------------------------------------------------------------
// POST /approvals/{id}/reject -- reject a pending request
// ---------------------------------------------------------------------------

/// Reject a pending request with an optional reason. Rejecting your own
/// request is allowed; it withdraws it.
pub async fn reject_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RejectApprovalRequest>,
) -> AppResult<impl IntoResponse> {
    let request = ApprovalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "approval_request",
            id,
        }))?;
    let access = project_access(&state.pool, request.project_id, auth.user_id).await?;

    let may_reject =
        access.capabilities.can_approve || request.requested_by == auth.user_id;
    if !may_reject {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Role '{}' cannot decide approval requests",
            access.role
        ))));
    }

    let decided = ApprovalRepo::reject(&state.pool, id, auth.user_id, input.reason.as_deref())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Request is not pending anymore".into(),
            ))
        })?;

    state.event_bus.publish(
        DomainEvent::new(names::APPROVAL_REJECTED)
            .with_source("approval_request", decided.id)
            .with_actor(auth.user_id)
            .with_payload(json!({ "resource_id": decided.resource_id })),
    );

    tracing::info!(
        user_id = auth.user_id,
        approval_id = decided.id,
        resource_id = %decided.resource_id,
        "Approval rejected"
    );

    Ok(DataResponse::new(decided))
}
