pub mod approval;
pub mod health;
pub mod playbook;
pub mod run;
pub mod work_queue;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects/{project_id}/playbooks                          registry + live counts
/// /projects/{project_id}/playbooks/{playbook}/estimate      read-only preflight
/// /projects/{project_id}/playbooks/{playbook}/settings      get, put rule params
/// /projects/{project_id}/playbooks/{playbook}/runs          list, trigger (idempotent)
/// /projects/{project_id}/playbooks/{playbook}/apply         synchronous apply pass
///
/// /projects/{project_id}/approvals                          list, create
/// /approvals/{id}/approve                                   grant (second party)
/// /approvals/{id}/reject                                    reject / withdraw
///
/// /projects/{project_id}/work-queue                         derived action queue
///
/// /runs/{run_id}                                            run inspection
/// ```
pub fn api_routes() -> Router<AppState> {
    let project_routes = Router::new()
        // Playbook registry, estimates, settings, runs, apply.
        .nest("/{project_id}/playbooks", playbook::router())
        // Approval requests scoped to a project.
        .nest("/{project_id}/approvals", approval::project_router())
        // Derived work queue.
        .nest("/{project_id}/work-queue", work_queue::router());

    Router::new()
        .nest("/projects", project_routes)
        // Approval decisions address the request directly.
        .nest("/approvals", approval::decision_router())
        // Run inspection by id.
        .nest("/runs", run::router())
}
