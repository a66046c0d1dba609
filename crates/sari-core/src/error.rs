//! # Error Types
//!
//! Domain-specific error types for sari-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sari-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  sari-ledger errors (separate crate)                                   │
//! │  └── LedgerError      - Store-level failures, wraps CoreError          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, limits, balances)
//! 3. Errors are enum variants, never String
//! 4. All errors surface synchronously; nothing is retried internally

use thiserror::Error;

use crate::money::Money;
use crate::types::CreditStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule violations.
///
/// Every operation either fully applies (aggregate fields and ledger entry
/// together) or fails with one of these and leaves no partial mutation
/// visible.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Customer cannot be found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Customer exists but was deactivated; no new financial activity.
    #[error("Customer {0} is deactivated")]
    CustomerInactive(String),

    /// Credit account cannot be found.
    #[error("Credit account not found: {0}")]
    AccountNotFound(String),

    /// Reward cannot be found in the catalog.
    #[error("Reward not found: {0}")]
    RewardNotFound(String),

    /// Reward exists but is switched off.
    #[error("Reward {0} is inactive")]
    RewardInactive(String),

    /// Reward tracks stock and none is left.
    #[error("Reward {0} is out of stock")]
    RewardOutOfStock(String),

    /// Zero or negative monetary/point amount where a positive one is needed.
    #[error("Invalid {field}: {reason}")]
    InvalidAmount { field: String, reason: String },

    /// Point balance below the reward's cost.
    ///
    /// A failed redemption leaves balance and ledger untouched.
    #[error("Insufficient points: have {available}, need {required}")]
    InsufficientPoints { available: i64, required: i64 },

    /// Opening this account would push outstanding credit past the limit.
    #[error("Credit limit exceeded: limit {limit}, outstanding {outstanding}, requested {requested}")]
    LimitExceeded {
        limit: Money,
        outstanding: Money,
        requested: Money,
    },

    /// The account is in a terminal status and takes no further activity.
    #[error("Credit account {id} is {status:?} and accepts no further payments")]
    AccountClosed { id: String, status: CreditStatus },

    /// A cached aggregate diverged from its ledger-derived value.
    /// Indicates a bug in the ledger itself, never caller input.
    #[error("Ledger invariant violated: {detail}")]
    InvariantViolation { detail: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidAmount error.
    pub fn invalid_amount(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidAmount {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvariantViolation error.
    pub fn invariant(detail: impl Into<String>) -> Self {
        CoreError::InvariantViolation {
            detail: detail.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid UUID, invalid phone).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
