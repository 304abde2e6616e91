//! Repository for the `projects` and `project_members` tables.

use sqlx::PgPool;

use fixline_core::roles::ROLE_ADMIN;
use fixline_core::types::DbId;

use crate::models::project::{Project, ProjectMember};

/// Column list for `projects` queries.
const PROJECT_COLUMNS: &str = "id, owner_id, name, require_approval, created_at, updated_at";

/// Column list for `project_members` queries.
const MEMBER_COLUMNS: &str = "id, project_id, user_id, role, created_at, updated_at";

/// Provides CRUD operations for projects and membership.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Create a project and enroll the owner as an admin member, in one
    /// transaction.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        name: &str,
    ) -> Result<Project, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO projects (owner_id, name) VALUES ($1, $2) RETURNING {PROJECT_COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(owner_id)
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO project_members (project_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(project.id)
            .bind(owner_id)
            .bind(ROLE_ADMIN)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(project)
    }

    /// Find a project by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Toggle the approval requirement for apply runs.
    pub async fn set_require_approval(
        pool: &PgPool,
        project_id: DbId,
        require_approval: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE projects SET require_approval = $2 WHERE id = $1")
            .bind(project_id)
            .bind(require_approval)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Add or update a member's role.
    pub async fn upsert_member(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<ProjectMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_members (project_id, user_id, role) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_project_members_project_user DO UPDATE \
             SET role = EXCLUDED.role \
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(project_id)
            .bind(user_id)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    /// The member's role in a project, or `None` for non-members.
    pub async fn member_role(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT role FROM project_members WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// List the members of a project.
    pub async fn list_members(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM project_members \
             WHERE project_id = $1 \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, ProjectMember>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
