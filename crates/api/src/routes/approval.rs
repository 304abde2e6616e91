//! Route definitions for the approval request workflow.
//!
//! Creation and listing are project-scoped; decisions address the
//! request directly.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::approval;
use crate::state::AppState;

/// Project-scoped approval routes, nested at
/// `/projects/{project_id}/approvals`.
///
/// ```text
/// GET  /    -> list_approvals
/// POST /    -> create_approval
/// ```
pub fn project_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(approval::list_approvals).post(approval::create_approval),
    )
}

/// Decision routes mounted at `/approvals`.
///
/// ```text
/// POST /{id}/approve    -> approve_request
/// POST /{id}/reject     -> reject_request
/// ```
pub fn decision_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/approve", post(approval::approve_request))
        .route("/{id}/reject", post(approval::reject_request))
}
