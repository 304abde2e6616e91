//! Read-only playbook estimate: scope size, projected cost, and quota
//! headroom in one response.

use fixline_core::error::CoreError;
use fixline_core::plan::{self, PlaybookEstimate};
use fixline_core::playbook::Playbook;
use fixline_core::types::DbId;
use fixline_db::repositories::ProjectRepo;
use sqlx::PgPool;

use crate::error::EngineError;
use crate::quota::{QuotaGate, ACTION_APPLY};
use crate::scope::ScopeResolver;

pub struct EstimateService;

impl EstimateService {
    /// Assemble the full estimate for one playbook on one project.
    ///
    /// No side effects; safe to call repeatedly and at any rate. Headroom
    /// is read against the apply action because the estimate is a
    /// preflight for apply.
    pub async fn estimate(
        pool: &PgPool,
        project_id: DbId,
        playbook: Playbook,
    ) -> Result<PlaybookEstimate, EngineError> {
        let project = ProjectRepo::find_by_id(pool, project_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "project",
                id: project_id,
            })?;
        let scope = ScopeResolver::resolve(pool, project_id, playbook).await?;
        let rules = ScopeResolver::resolve_rules(pool, project_id, playbook).await?;
        let ctx = QuotaGate::context(pool, &project, ACTION_APPLY).await?;

        Ok(plan::assemble_estimate(
            playbook,
            ctx.plan,
            ctx.usage,
            scope.total_affected,
            scope.scope_hash,
            rules.rules_hash,
        ))
    }
}
