//! HTTP error surface.
//!
//! Every handler returns [`AppResult`]; whatever goes wrong is folded
//! into [`AppError`] and rendered as `{ "error": .., "code": .. }` with
//! a stable machine-readable code. Internal details (SQL, provider
//! chatter) are logged server-side and never leak into the body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use fixline_core::error::CoreError;
use fixline_core::run::ErrorCode;
use fixline_engine::EngineError;

/// Application-level error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `fixline_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The content provider failed while a request was being served.
    #[error("Content provider error: {0}")]
    Provider(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Core(core) => AppError::Core(core),
            EngineError::Database(db) => AppError::Database(db),
            EngineError::Generate(gen) => AppError::Provider(gen.to_string()),
        }
    }
}

impl AppError {
    /// Status, stable code, and client-safe message for this error.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => database_parts(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Provider(msg) => {
                tracing::error!(error = %msg, "Content provider error");
                (
                    StatusCode::BAD_GATEWAY,
                    "PROVIDER_ERROR",
                    "The content provider failed".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Scope conflicts carry both hashes in the body so the caller can
        // re-estimate without a second request.
        if let AppError::Core(CoreError::ScopeConflict { expected, actual }) = &self {
            let body = json!({
                "error": self.to_string(),
                "code": "SCOPE_CONFLICT",
                "expected": expected,
                "actual": actual,
            });
            return (StatusCode::CONFLICT, axum::Json(body)).into_response();
        }

        let (status, code, message) = self.parts();
        let body = json!({ "error": message, "code": code });
        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error onto the wire contract.
fn core_parts(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        // Rendered with a richer body in into_response; this arm only
        // feeds logging paths that want the flat form.
        CoreError::ScopeConflict { expected, actual } => (
            StatusCode::CONFLICT,
            "SCOPE_CONFLICT",
            format!("Scope conflict: expected {expected}, current scope is {actual}"),
        ),
        CoreError::QuotaExceeded { reason } => (
            StatusCode::TOO_MANY_REQUESTS,
            "QUOTA_EXCEEDED",
            reason.clone(),
        ),
        CoreError::ApprovalRequired { resource_id } => (
            StatusCode::FORBIDDEN,
            "APPROVAL_REQUIRED",
            format!("Approval required for {resource_id}"),
        ),
        CoreError::Contract { code, message } => {
            (StatusCode::CONFLICT, stale_code(*code), message.clone())
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Map a sqlx error onto the wire contract.
///
/// Row-not-found is a plain 404. A violated `uq_` unique constraint is
/// a 409: those constraints guard idempotency keys and one-active-row
/// rules, so the duplicate is the caller's to resolve. Anything else is
/// a sanitized 500.
fn database_parts(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // 23505 = unique_violation.
            let duplicate = db_err.code().as_deref() == Some("23505");
            match db_err.constraint().filter(|c| duplicate && c.starts_with("uq_")) {
                Some(constraint) => (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                ),
                None => {
                    tracing::error!(error = %db_err, "Database error");
                    internal()
                }
            }
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

/// Error code for a stale-run contract violation.
///
/// The 409 tells the caller the run can never succeed as bound; the code
/// names which binding broke so the client knows what to redo.
fn stale_code(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::ScopeInvalid => "STALE_SCOPE_INVALID",
        ErrorCode::RulesChanged => "STALE_RULES_CHANGED",
        ErrorCode::DraftNotFound => "STALE_DRAFT_NOT_FOUND",
        // Non-contract codes never travel in a Contract error.
        _ => "CONFLICT",
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
