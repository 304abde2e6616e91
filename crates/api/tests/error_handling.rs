//! `AppError` rendering tests.
//!
//! Each variant must come out as the agreed status, stable `code`, and a
//! body that never leaks internals. No server needed: the tests call
//! `IntoResponse` on the error values directly and inspect the result.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;

use fixline_api::error::AppError;
use fixline_core::error::CoreError;
use fixline_core::run::ErrorCode;

/// Render an error the way a handler would and parse what came out.
async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

// ---------------------------------------------------------------------------
// Core error mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let (status, json) = render(AppError::Core(CoreError::NotFound {
        entity: "project",
        id: 42,
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "project with id 42 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let (status, json) =
        render(AppError::Core(CoreError::Validation("Unknown playbook 'fix-all'".into()))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Unknown playbook 'fix-all'");
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let (status, json) =
        render(AppError::Core(CoreError::Conflict("duplicate request".into()))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "duplicate request");
}

#[tokio::test]
async fn unauthorized_error_returns_401() {
    let (status, json) =
        render(AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Invalid or expired token");
}

#[tokio::test]
async fn forbidden_error_returns_403() {
    let (status, json) = render(AppError::Core(CoreError::Forbidden(
        "Role 'viewer' cannot apply playbooks".into(),
    )))
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
    assert_eq!(json["error"], "Role 'viewer' cannot apply playbooks");
}

#[tokio::test]
async fn quota_exceeded_returns_429() {
    let (status, json) = render(AppError::Core(CoreError::QuotaExceeded {
        reason: "daily AI action limit reached".into(),
    }))
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["code"], "QUOTA_EXCEEDED");
    assert_eq!(json["error"], "daily AI action limit reached");
}

#[tokio::test]
async fn approval_required_returns_403() {
    let (status, json) = render(AppError::Core(CoreError::ApprovalRequired {
        resource_id: "fill-missing-titles:abc123".into(),
    }))
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "APPROVAL_REQUIRED");
    assert_eq!(json["error"], "Approval required for fill-missing-titles:abc123");
}

#[tokio::test]
async fn scope_conflict_carries_expected_and_actual_hashes() {
    let (status, json) = render(AppError::Core(CoreError::ScopeConflict {
        expected: "aaaa1111".into(),
        actual: "bbbb2222".into(),
    }))
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "SCOPE_CONFLICT");
    // Both hashes ride in the body so the client can re-estimate directly.
    assert_eq!(json["expected"], "aaaa1111");
    assert_eq!(json["actual"], "bbbb2222");
}

// ---------------------------------------------------------------------------
// Contract violations (stale runs)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn contract_violation_maps_to_stale_code() {
    let (status, json) = render(AppError::Core(CoreError::Contract {
        code: ErrorCode::RulesChanged,
        message: "rule parameters changed since the draft was generated".into(),
    }))
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "STALE_RULES_CHANGED");
    assert_eq!(
        json["error"],
        "rule parameters changed since the draft was generated"
    );
}

#[tokio::test]
async fn missing_draft_contract_maps_to_stale_draft_code() {
    let (status, json) = render(AppError::Core(CoreError::Contract {
        code: ErrorCode::DraftNotFound,
        message: "no ready draft for this scope and rules".into(),
    }))
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "STALE_DRAFT_NOT_FOUND");
}

#[tokio::test]
async fn invalid_scope_contract_maps_to_stale_scope_code() {
    let (status, json) = render(AppError::Core(CoreError::Contract {
        code: ErrorCode::ScopeInvalid,
        message: "the scope this run was bound to no longer exists".into(),
    }))
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "STALE_SCOPE_INVALID");
}

// ---------------------------------------------------------------------------
// HTTP-specific variants and sanitized 5xx surfaces
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_error_returns_400() {
    let (status, json) =
        render(AppError::BadRequest("idempotency_key must not be empty".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "idempotency_key must not be empty");
}

#[tokio::test]
async fn database_row_not_found_returns_404() {
    let (status, json) = render(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Resource not found");
}

#[tokio::test]
async fn provider_error_returns_502_and_sanitizes_message() {
    let (status, json) =
        render(AppError::Provider("upstream returned 500 with secret trace".into())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "PROVIDER_ERROR");
    assert!(
        !json.to_string().contains("secret"),
        "Provider error response must not leak upstream details"
    );
    assert_eq!(json["error"], "The content provider failed");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let (status, json) =
        render(AppError::InternalError("secret database credentials leaked".into())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(
        !json.to_string().contains("secret"),
        "Internal error response must not leak sensitive details"
    );
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn core_internal_error_returns_500_and_sanitizes() {
    let (status, json) =
        render(AppError::Core(CoreError::Internal("panic stack trace here".into()))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(
        !json.to_string().contains("panic stack trace"),
        "Core internal error must not leak details"
    );
    assert_eq!(json["error"], "An internal error occurred");
}
