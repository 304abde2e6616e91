//! Route definitions for the playbook registry, settings, estimates,
//! runs, and the synchronous apply endpoint.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{playbook, run};
use crate::state::AppState;

/// Playbook routes, nested at `/projects/{project_id}/playbooks`.
///
/// ```text
/// GET  /                        -> list_playbooks
/// GET  /{playbook}/estimate     -> get_estimate
/// GET  /{playbook}/settings     -> get_settings
/// PUT  /{playbook}/settings     -> put_settings
/// GET  /{playbook}/runs         -> list_runs
/// POST /{playbook}/runs         -> trigger_run
/// POST /{playbook}/apply        -> apply_playbook
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(playbook::list_playbooks))
        .route("/{playbook}/estimate", get(playbook::get_estimate))
        .route(
            "/{playbook}/settings",
            get(playbook::get_settings).put(playbook::put_settings),
        )
        .route("/{playbook}/runs", get(run::list_runs).post(run::trigger_run))
        .route("/{playbook}/apply", post(run::apply_playbook))
}
