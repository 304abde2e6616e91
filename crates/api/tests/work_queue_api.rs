//! HTTP-level integration tests for the unified work queue.
//!
//! Tests cover:
//! - Bundle derivation from issues, playbook scopes, and export state
//! - State precedence (blocked plans, ready drafts, pending approvals)
//! - Tab and bundle filters
//! - Deterministic repeat reads

mod common;

use axum::http::StatusCode;
use common::{body_bytes, body_json, get_auth, post_json_auth};
use serde_json::json;
use sqlx::PgPool;

use fixline_core::approval::{apply_resource_id, RESOURCE_TYPE_PLAYBOOK_APPLY};
use fixline_core::playbook::Playbook;
use fixline_core::types::DbId;
use fixline_db::models::project::Project;
use fixline_db::models::user::User;
use fixline_db::repositories::{IssueRepo, ProductRepo, ProjectRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a user on the given plan, a project they own, and a bearer token.
async fn seed_owner(pool: &PgPool, email: &str, plan: &str) -> (User, Project, String) {
    let user = UserRepo::create(pool, email, "Test Owner", plan)
        .await
        .expect("user creation should succeed");
    let project = ProjectRepo::create(pool, user.id, "Test Catalog")
        .await
        .expect("project creation should succeed");
    let token = common::mint_token(user.id);
    (user, project, token)
}

/// Add a member with the given role and mint their token.
async fn seed_member(pool: &PgPool, project_id: DbId, email: &str, role: &str) -> (User, String) {
    let user = UserRepo::create(pool, email, "Test Member", "free")
        .await
        .expect("user creation should succeed");
    ProjectRepo::upsert_member(pool, project_id, user.id, role)
        .await
        .expect("member enrollment should succeed");
    let token = common::mint_token(user.id);
    (user, token)
}

/// Insert a product with no title, description, or SEO description.
async fn seed_untitled(pool: &PgPool, project_id: DbId, external_ref: &str) {
    ProductRepo::create(pool, project_id, external_ref, "Basic Tee", None, None, None)
        .await
        .expect("product creation should succeed");
}

fn queue_path(project_id: DbId) -> String {
    format!("/api/v1/projects/{project_id}/work-queue")
}

/// Find one bundle by id in a queue response, panicking when absent.
fn find_bundle<'a>(items: &'a [serde_json::Value], bundle_id: &str) -> &'a serde_json::Value {
    items
        .iter()
        .find(|b| b["bundle_id"] == bundle_id)
        .unwrap_or_else(|| panic!("bundle {bundle_id} missing from queue"))
}

// ---------------------------------------------------------------------------
// Derivation basics
// ---------------------------------------------------------------------------

/// An empty project still has a queue: one bundle per registered playbook
/// plus the export card, nothing else.
#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_project_yields_playbook_and_export_bundles(pool: PgPool) {
    let (_owner, project, token) = seed_owner(&pool, "owner@test.com", "pro").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, &queue_path(project.id), &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 4, "three playbooks plus the export card");

    let export = find_bundle(items, "export:catalog");
    assert_eq!(export["bundle_type"], "export");
    assert_eq!(export["state"], "NEW");
    assert_eq!(export["scope_count"], 0);
    assert_eq!(export["ai_usage"], "none");

    let titles = find_bundle(items, "playbook:fill-missing-titles");
    assert_eq!(titles["state"], "NEW");
    assert_eq!(titles["scope_count"], 0);
    assert_eq!(titles["health"], "HEALTHY");
}

/// Products with missing fields show up as the playbook's scope count.
#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_fields_raise_playbook_scope_counts(pool: PgPool) {
    let (_owner, project, token) = seed_owner(&pool, "owner@test.com", "pro").await;
    seed_untitled(&pool, project.id, "sku-1").await;
    seed_untitled(&pool, project.id, "sku-2").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, &queue_path(project.id), &token).await;

    let json = body_json(response).await;
    let items = json["data"]["items"].as_array().unwrap();

    let titles = find_bundle(items, "playbook:fill-missing-titles");
    assert_eq!(titles["scope_count"], 2);
    assert_eq!(titles["ai_usage"], "ai_assisted");
    assert_eq!(titles["action_key"], "missing_titles");
}

/// Open issues group into one bundle per action category, with health
/// folded from the worst severity.
#[sqlx::test(migrations = "../../db/migrations")]
async fn issues_group_by_action_category(pool: PgPool) {
    let (_owner, project, token) = seed_owner(&pool, "owner@test.com", "pro").await;
    IssueRepo::create(&pool, project.id, None, "missing product title", "warning", None)
        .await
        .expect("issue creation should succeed");
    IssueRepo::create(&pool, project.id, None, "broken image link", "critical", None)
        .await
        .expect("issue creation should succeed");
    IssueRepo::create(&pool, project.id, None, "broken video embed", "warning", None)
        .await
        .expect("issue creation should succeed");

    let app = common::build_test_app(pool);
    let response = get_auth(app, &queue_path(project.id), &token).await;

    let json = body_json(response).await;
    let items = json["data"]["items"].as_array().unwrap();

    let titles = find_bundle(items, "issues:missing_titles");
    assert_eq!(titles["bundle_type"], "issue_group");
    assert_eq!(titles["scope_count"], 1);
    assert_eq!(titles["health"], "NEEDS_ATTENTION");
    assert_eq!(titles["ai_usage"], "manual");

    let media = find_bundle(items, "issues:broken_media");
    assert_eq!(media["scope_count"], 2);
    assert_eq!(media["health"], "CRITICAL", "worst severity wins");
}

/// The viewer block carries the caller's role and capability set.
#[sqlx::test(migrations = "../../db/migrations")]
async fn queue_reports_viewer_capabilities(pool: PgPool) {
    let (_owner, project, _token) = seed_owner(&pool, "owner@test.com", "pro").await;
    let (_viewer, viewer_token) =
        seed_member(&pool, project.id, "viewer@test.com", "viewer").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, &queue_path(project.id), &viewer_token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let viewer = &json["data"]["viewer"];
    assert_eq!(viewer["role"], "viewer");
    assert_eq!(viewer["capabilities"]["can_apply"], false);
    assert_eq!(viewer["capabilities"]["can_approve"], false);
    assert_eq!(viewer["capabilities"]["can_generate_drafts"], false);
    assert_eq!(viewer["capabilities"]["can_request_approval"], false);
}

/// The same catalog state always derives the same queue, byte for byte.
#[sqlx::test(migrations = "../../db/migrations")]
async fn repeat_reads_are_identical(pool: PgPool) {
    let (_owner, project, token) = seed_owner(&pool, "owner@test.com", "pro").await;
    seed_untitled(&pool, project.id, "sku-1").await;
    IssueRepo::create(&pool, project.id, None, "missing product title", "warning", None)
        .await
        .expect("issue creation should succeed");

    let app = common::build_test_app(pool.clone());
    let first = body_bytes(get_auth(app, &queue_path(project.id), &token).await).await;

    let app = common::build_test_app(pool);
    let second = body_bytes(get_auth(app, &queue_path(project.id), &token).await).await;

    assert_eq!(first, second, "the queue must be a pure projection");
}

// ---------------------------------------------------------------------------
// State precedence
// ---------------------------------------------------------------------------

/// On the free plan playbook bundles are BLOCKED, not NEW.
#[sqlx::test(migrations = "../../db/migrations")]
async fn free_plan_marks_playbook_bundles_blocked(pool: PgPool) {
    let (_owner, project, token) = seed_owner(&pool, "owner@test.com", "free").await;
    seed_untitled(&pool, project.id, "sku-1").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, &queue_path(project.id), &token).await;

    let json = body_json(response).await;
    let items = json["data"]["items"].as_array().unwrap();

    let titles = find_bundle(items, "playbook:fill-missing-titles");
    assert_eq!(titles["state"], "BLOCKED");
}

/// A ready draft moves the bundle to DRAFTS_READY and attaches the draft
/// summary.
#[sqlx::test(migrations = "../../db/migrations")]
async fn ready_draft_moves_bundle_to_drafts_ready(pool: PgPool) {
    let (_owner, project, token) = seed_owner(&pool, "owner@test.com", "pro").await;
    seed_untitled(&pool, project.id, "sku-1").await;
    seed_untitled(&pool, project.id, "sku-2").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!(
            "/api/v1/projects/{}/playbooks/fill-missing-titles/runs",
            project.id
        ),
        json!({ "run_type": "draft_generate", "idempotency_key": "queue-draft" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let run_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    common::process_run(&pool, run_id)
        .await
        .expect("draft generation should succeed");

    let app = common::build_test_app(pool);
    let response = get_auth(app, &queue_path(project.id), &token).await;

    let json = body_json(response).await;
    let items = json["data"]["items"].as_array().unwrap();

    let titles = find_bundle(items, "playbook:fill-missing-titles");
    assert_eq!(titles["state"], "DRAFTS_READY");
    assert_eq!(titles["draft"]["item_count"], 2);
    assert_eq!(titles["draft"]["status"], "READY");
}

/// A pending approval for the live scope outranks every other state.
#[sqlx::test(migrations = "../../db/migrations")]
async fn pending_approval_takes_precedence(pool: PgPool) {
    let (_owner, project, token) = seed_owner(&pool, "owner@test.com", "pro").await;
    seed_untitled(&pool, project.id, "sku-1").await;

    // Bind the request to the live scope so the queue counts it.
    let scope = fixline_engine::scope::ScopeResolver::resolve(
        &pool,
        project.id,
        Playbook::FillMissingTitles,
    )
    .await
    .expect("scope resolution should succeed");
    let resource_id = apply_resource_id(Playbook::FillMissingTitles, &scope.scope_hash);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/projects/{}/approvals", project.id),
        json!({
            "resource_type": RESOURCE_TYPE_PLAYBOOK_APPLY,
            "resource_id": resource_id,
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &queue_path(project.id), &token).await;
    let json = body_json(response).await;
    let items = json["data"]["items"].as_array().unwrap();

    let titles = find_bundle(items, "playbook:fill-missing-titles");
    assert_eq!(titles["state"], "PENDING_APPROVAL");
    assert_eq!(titles["approval"]["status"], "PENDING");

    // The approvals tab shows exactly this bundle.
    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("{}?tab=approvals", queue_path(project.id)),
        &token,
    )
    .await;
    let json = body_json(response).await;
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["bundle_id"], "playbook:fill-missing-titles");
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// The issues tab hides playbook and export bundles.
#[sqlx::test(migrations = "../../db/migrations")]
async fn issues_tab_shows_only_issue_bundles(pool: PgPool) {
    let (_owner, project, token) = seed_owner(&pool, "owner@test.com", "pro").await;
    seed_untitled(&pool, project.id, "sku-1").await;
    IssueRepo::create(&pool, project.id, None, "missing product title", "warning", None)
        .await
        .expect("issue creation should succeed");

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("{}?tab=issues", queue_path(project.id)),
        &token,
    )
    .await;

    let json = body_json(response).await;
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["bundle_type"], "issue_group");
}

/// The bundle_type filter narrows to one kind.
#[sqlx::test(migrations = "../../db/migrations")]
async fn bundle_type_filter_narrows_to_exports(pool: PgPool) {
    let (_owner, project, token) = seed_owner(&pool, "owner@test.com", "pro").await;
    seed_untitled(&pool, project.id, "sku-1").await;

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("{}?bundle_type=export", queue_path(project.id)),
        &token,
    )
    .await;

    let json = body_json(response).await;
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["bundle_id"], "export:catalog");
}

/// An unknown tab value is a validation error.
#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_tab_returns_400(pool: PgPool) {
    let (_owner, project, token) = seed_owner(&pool, "owner@test.com", "pro").await;

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("{}?tab=everything", queue_path(project.id)),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

/// Non-members get 403.
#[sqlx::test(migrations = "../../db/migrations")]
async fn non_member_cannot_read_the_queue(pool: PgPool) {
    let (_owner, project, _token) = seed_owner(&pool, "owner@test.com", "pro").await;
    let outsider = UserRepo::create(&pool, "outsider@test.com", "Outsider", "free")
        .await
        .expect("user creation should succeed");
    let outsider_token = common::mint_token(outsider.id);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &queue_path(project.id), &outsider_token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
