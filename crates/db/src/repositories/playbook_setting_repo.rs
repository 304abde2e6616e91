//! Repository for the `playbook_settings` table.

use sqlx::PgPool;

use fixline_core::types::DbId;

use crate::models::playbook_setting::PlaybookSetting;

/// Column list for `playbook_settings` queries.
const COLUMNS: &str = "id, project_id, playbook_key, params, created_at, updated_at";

/// Provides operations for per-project playbook configuration.
pub struct PlaybookSettingRepo;

impl PlaybookSettingRepo {
    /// The settings row for one playbook, if configured.
    pub async fn find(
        pool: &PgPool,
        project_id: DbId,
        playbook_key: &str,
    ) -> Result<Option<PlaybookSetting>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM playbook_settings \
             WHERE project_id = $1 AND playbook_key = $2"
        );
        sqlx::query_as::<_, PlaybookSetting>(&query)
            .bind(project_id)
            .bind(playbook_key)
            .fetch_optional(pool)
            .await
    }

    /// Create or replace the settings row for one playbook.
    pub async fn upsert(
        pool: &PgPool,
        project_id: DbId,
        playbook_key: &str,
        params: &serde_json::Value,
    ) -> Result<PlaybookSetting, sqlx::Error> {
        let query = format!(
            "INSERT INTO playbook_settings (project_id, playbook_key, params) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_playbook_settings_project_playbook DO UPDATE \
             SET params = EXCLUDED.params \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PlaybookSetting>(&query)
            .bind(project_id)
            .bind(playbook_key)
            .bind(params)
            .fetch_one(pool)
            .await
    }
}
