use crate::run::ErrorCode;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The scope hash supplied by the caller no longer matches the live
    /// catalog. Carries both hashes so the caller can see what drifted.
    #[error("Scope conflict: expected {expected}, current scope is {actual}")]
    ScopeConflict { expected: String, actual: String },

    /// A plan or daily quota refused the operation before any work.
    #[error("Quota exceeded: {reason}")]
    QuotaExceeded { reason: String },

    /// The project requires a second-party approval and none is valid for
    /// the resource being applied.
    #[error("Approval required for {resource_id}")]
    ApprovalRequired { resource_id: String },

    /// A preview/draft contract was violated at processing time (scope
    /// invalid, rules changed, draft missing). These mark a run STALE
    /// rather than FAILED: the caller must redo preview/draft.
    #[error("Contract violation ({}): {message}", code.as_str())]
    Contract { code: ErrorCode, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}
