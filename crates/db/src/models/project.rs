//! Project and membership entity models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use fixline_core::types::{DbId, Timestamp};

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    /// Governance switch: apply runs on this project need a live approval.
    pub require_approval: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `project_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectMember {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /api/v1/projects`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
}
