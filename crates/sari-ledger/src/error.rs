//! # Ledger Error Types
//!
//! Error types for the stateful ledger layer.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  CoreError / ValidationError (sari-core)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LedgerError (this module) ← one surface for every caller              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UI / admin collaborator displays user-friendly message                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything surfaces synchronously; the ledger never retries. Retrying
//! (say, a corrected payment amount) is the caller's job.

use thiserror::Error;

use sari_core::{CoreError, ValidationError};

/// Errors returned by the ledger managers.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A business rule violation from the core taxonomy.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Caller input failed validation before any lock was taken.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl LedgerError {
    /// True for the "unknown id" family (customer/account/reward).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::Core(
                CoreError::CustomerNotFound(_)
                    | CoreError::AccountNotFound(_)
                    | CoreError::RewardNotFound(_)
            )
        )
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_passes_through() {
        let err: LedgerError = CoreError::CustomerNotFound("cust-1".to_string()).into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Customer not found: cust-1");
    }

    #[test]
    fn test_validation_error_is_not_not_found() {
        let err: LedgerError = ValidationError::Required {
            field: "phone".to_string(),
        }
        .into();
        assert!(!err.is_not_found());
    }
}
