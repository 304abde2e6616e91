use fixline_core::error::CoreError;
use fixline_core::run::ErrorCode;

use crate::generator::GenerateError;

/// Anything that can abort run processing.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

impl EngineError {
    /// Classification code recorded on the run row. The code alone decides
    /// the terminal status: contract violations go STALE, the rest FAILED.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Core(CoreError::ScopeConflict { .. }) => ErrorCode::ScopeInvalid,
            Self::Core(CoreError::Contract { code, .. }) => *code,
            Self::Core(CoreError::QuotaExceeded { .. }) => ErrorCode::QuotaExceeded,
            Self::Core(CoreError::ApprovalRequired { .. }) => ErrorCode::ApprovalRequired,
            Self::Core(_) => ErrorCode::Internal,
            Self::Database(_) => ErrorCode::Database,
            Self::Generate(GenerateError::RateLimited) => ErrorCode::RateLimited,
            Self::Generate(GenerateError::Provider(_)) => ErrorCode::ProviderFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_conflict_classifies_as_contract_violation() {
        let err = EngineError::from(CoreError::ScopeConflict {
            expected: "a".into(),
            actual: "b".into(),
        });
        assert_eq!(err.error_code(), ErrorCode::ScopeInvalid);
        assert!(err.error_code().is_contract_violation());
    }

    #[test]
    fn quota_and_provider_failures_are_not_contract_violations() {
        let quota = EngineError::from(CoreError::QuotaExceeded {
            reason: "daily limit".into(),
        });
        assert_eq!(quota.error_code(), ErrorCode::QuotaExceeded);
        assert!(!quota.error_code().is_contract_violation());

        let provider = EngineError::from(GenerateError::Provider("boom".into()));
        assert_eq!(provider.error_code(), ErrorCode::ProviderFailed);

        let throttled = EngineError::from(GenerateError::RateLimited);
        assert_eq!(throttled.error_code(), ErrorCode::RateLimited);
    }

    #[test]
    fn contract_errors_carry_their_own_code() {
        let err = EngineError::from(CoreError::Contract {
            code: ErrorCode::DraftNotFound,
            message: "no ready draft".into(),
        });
        assert_eq!(err.error_code(), ErrorCode::DraftNotFound);
    }
}
