//! Route definitions for top-level run inspection.

use axum::routing::get;
use axum::Router;

use crate::handlers::run;
use crate::state::AppState;

/// Run routes mounted at `/runs`.
///
/// ```text
/// GET /{run_id}    -> get_run
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{run_id}", get(run::get_run))
}
