//! Route definition for the unified work queue.

use axum::routing::get;
use axum::Router;

use crate::handlers::work_queue;
use crate::state::AppState;

/// Work queue route, nested at `/projects/{project_id}/work-queue`.
///
/// ```text
/// GET /?tab=&bundle_type=&bundle_id=    -> get_work_queue
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(work_queue::get_work_queue))
}
