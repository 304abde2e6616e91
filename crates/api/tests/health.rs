//! Integration tests for the health endpoints and the shared middleware
//! stack (request ids, CORS, auth gating, 404s).

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use sqlx::PgPool;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Health endpoints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_ok_and_the_crate_version(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    // Integration tests compile in the same package, so the versions match.
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn db_probe_reports_healthy(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health/db").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["healthy"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_is_a_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/no/such/route").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Request id middleware
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn responses_carry_a_generated_request_id(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    let id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header should be set")
        .to_str()
        .unwrap();
    assert!(
        uuid::Uuid::parse_str(id).is_ok(),
        "x-request-id should be a UUID, got {id}"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_supplied_request_id_is_echoed(pool: PgPool) {
    let app = common::build_test_app(pool);
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-7")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    // The set-request-id layer only fills the header in when missing.
    let id = response.headers().get("x-request-id").unwrap();
    assert_eq!(id, "trace-me-7");
}

// ---------------------------------------------------------------------------
// CORS and auth gating
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn cors_preflight_allows_the_configured_origin(pool: PgPool) {
    let app = common::build_test_app(pool);
    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/projects/1/work-queue")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "GET")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(preflight).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(headers.get("access-control-allow-credentials").unwrap(), "true");

    let methods = headers
        .get("access-control-allow-methods")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(methods.contains("GET") && methods.contains("PUT"), "{methods}");
    // The API serves no PATCH routes and the policy says so.
    assert!(!methods.contains("PATCH"), "{methods}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn api_routes_reject_anonymous_requests(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/projects/1/work-queue").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}
