//! Integration tests for the AI usage ledger and catalog exports.

use fixline_db::models::status::ExportStatus;
use fixline_db::repositories::{ExportRepo, ProjectRepo, UsageRepo, UserRepo};
use sqlx::PgPool;

async fn seed_owner_project(pool: &PgPool) -> (i64, i64) {
    let owner = UserRepo::create(pool, "owner@example.com", "Owner", "starter")
        .await
        .unwrap();
    let project = ProjectRepo::create(pool, owner.id, "Catalog").await.unwrap();
    (owner.id, project.id)
}

// ---------------------------------------------------------------------------
// Test: Usage ledger rollups
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_daily_usage_counts_per_action_tokens_overall(pool: PgPool) {
    let (owner_id, project_id) = seed_owner_project(&pool).await;

    UsageRepo::record(&pool, owner_id, project_id, "playbook_apply", 40, None, None)
        .await
        .unwrap();
    UsageRepo::record(&pool, owner_id, project_id, "playbook_apply", 60, None, None)
        .await
        .unwrap();
    UsageRepo::record(&pool, owner_id, project_id, "preview_generate", 15, None, None)
        .await
        .unwrap();

    let usage = UsageRepo::daily_usage(&pool, owner_id, "playbook_apply")
        .await
        .unwrap();
    // Action counts are per action; the token total spans every action.
    assert_eq!(usage.actions, 2);
    assert_eq!(usage.tokens, 115);

    let previews = UsageRepo::daily_usage(&pool, owner_id, "preview_generate")
        .await
        .unwrap();
    assert_eq!(previews.actions, 1);
    assert_eq!(previews.tokens, 115);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_daily_usage_is_per_user(pool: PgPool) {
    let (owner_id, project_id) = seed_owner_project(&pool).await;
    let other = UserRepo::create(&pool, "other@example.com", "Other", "free")
        .await
        .unwrap();

    UsageRepo::record(&pool, owner_id, project_id, "playbook_apply", 40, None, None)
        .await
        .unwrap();

    let usage = UsageRepo::daily_usage(&pool, other.id, "playbook_apply")
        .await
        .unwrap();
    assert_eq!(usage.actions, 0);
    assert_eq!(usage.tokens, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_daily_usage_excludes_yesterday(pool: PgPool) {
    let (owner_id, project_id) = seed_owner_project(&pool).await;

    let event = UsageRepo::record(&pool, owner_id, project_id, "playbook_apply", 40, None, None)
        .await
        .unwrap();
    sqlx::query("UPDATE ai_usage_events SET created_at = NOW() - INTERVAL '25 hours' WHERE id = $1")
        .bind(event.id)
        .execute(&pool)
        .await
        .unwrap();

    let usage = UsageRepo::daily_usage(&pool, owner_id, "playbook_apply")
        .await
        .unwrap();
    assert_eq!(usage.actions, 0, "yesterday's events do not count toward today");
    assert_eq!(usage.tokens, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_usage_rows_attach_to_runs(pool: PgPool) {
    let (owner_id, project_id) = seed_owner_project(&pool).await;

    use fixline_core::playbook::Playbook;
    use fixline_db::models::status::RunType;
    let run = fixline_db::repositories::RunRepo::create_idempotent(
        &pool,
        project_id,
        owner_id,
        Playbook::FillMissingTitles.key(),
        RunType::Apply,
        None,
        None,
        "key-1",
    )
    .await
    .unwrap();

    UsageRepo::record(&pool, owner_id, project_id, "playbook_apply", 40, Some(run.id), None)
        .await
        .unwrap();
    UsageRepo::record(&pool, owner_id, project_id, "playbook_apply", 60, Some(run.id), None)
        .await
        .unwrap();
    UsageRepo::record(&pool, owner_id, project_id, "playbook_apply", 10, None, None)
        .await
        .unwrap();

    let rows = UsageRepo::list_for_run(&pool, run.id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].tokens, 40);
    assert_eq!(rows[1].tokens, 60);
}

// ---------------------------------------------------------------------------
// Test: Catalog exports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_record_export_upserts_single_row(pool: PgPool) {
    let (_, project_id) = seed_owner_project(&pool).await;

    assert!(ExportRepo::find_for_project(&pool, project_id).await.unwrap().is_none());

    let first = ExportRepo::record_export(&pool, project_id, "token-1", 10)
        .await
        .unwrap();
    assert_eq!(first.status_id, ExportStatus::Exported.id());
    assert_eq!(first.product_count, 10);
    assert!(first.last_exported_at.is_some());

    let second = ExportRepo::record_export(&pool, project_id, "token-2", 12)
        .await
        .unwrap();
    assert_eq!(second.id, first.id, "re-export should reuse the project row");
    assert_eq!(second.share_token.as_deref(), Some("token-2"));
    assert_eq!(second.product_count, 12);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mark_stale_only_downgrades_exported(pool: PgPool) {
    let (_, project_id) = seed_owner_project(&pool).await;

    // No export row yet: nothing to do, no error.
    ExportRepo::mark_stale(&pool, project_id).await.unwrap();

    ExportRepo::record_export(&pool, project_id, "token-1", 10)
        .await
        .unwrap();
    ExportRepo::mark_stale(&pool, project_id).await.unwrap();

    let stale = ExportRepo::find_for_project(&pool, project_id).await.unwrap().unwrap();
    assert_eq!(stale.status_id, ExportStatus::Stale.id());

    // Re-exporting clears the stale flag.
    let refreshed = ExportRepo::record_export(&pool, project_id, "token-2", 11)
        .await
        .unwrap();
    assert_eq!(refreshed.status_id, ExportStatus::Exported.id());
}
