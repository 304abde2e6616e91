//! Per-project access resolution shared by all project-scoped handlers.

use sqlx::PgPool;

use fixline_core::error::CoreError;
use fixline_core::roles::{capabilities_for_role, Capabilities, ROLE_ADMIN};
use fixline_core::types::DbId;
use fixline_db::models::project::Project;
use fixline_db::repositories::ProjectRepo;

use crate::error::{AppError, AppResult};

/// The caller's standing on one project: the project row, the resolved
/// role name, and the capability set it grants.
#[derive(Debug, Clone)]
pub struct ProjectAccess {
    pub project: Project,
    pub role: String,
    pub capabilities: Capabilities,
}

/// Load a project and resolve the caller's role on it.
///
/// The owner acts as an admin without a membership row. Non-members are
/// rejected outright; members get the capability set for their role
/// (viewers resolve to the empty set, which still permits reads).
pub async fn project_access(
    pool: &PgPool,
    project_id: DbId,
    user_id: DbId,
) -> AppResult<ProjectAccess> {
    let project = ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "project",
            id: project_id,
        }))?;

    if project.owner_id == user_id {
        return Ok(ProjectAccess {
            project,
            role: ROLE_ADMIN.to_string(),
            capabilities: capabilities_for_role(ROLE_ADMIN),
        });
    }

    let role = ProjectRepo::member_role(pool, project_id, user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "Not a member of this project".into(),
            ))
        })?;
    let capabilities = capabilities_for_role(&role);

    Ok(ProjectAccess {
        project,
        role,
        capabilities,
    })
}
