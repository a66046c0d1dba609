//! # Validation Module
//!
//! Input validation utilities for the ledger API surface.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI / admin collaborator                                      │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Fail fast before any lock is taken                                │
//! │  └── Business rule validation happens in the managers after it        │
//! │                                                                         │
//! │  Defense in depth: the managers never trust the caller anyway          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

/// Result type for validation operations.
///
/// Format/shape checks fail with `ValidationError`; zero-or-negative amount
/// checks fail with `CoreError::InvalidAmount` directly, since that is the
/// business taxonomy callers match on.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer name part (first or last name).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 100 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty
/// - Digits, spaces, `+` and `-` only
/// - At most 20 characters
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 20,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == ' ')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, '+' and '-'".to_string(),
        });
    }

    Ok(())
}

/// Validates an operator identity (cashier / processed-by).
pub fn validate_operator(operator: &str) -> ValidationResult<()> {
    if operator.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "operator".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a strictly positive monetary amount.
///
/// ## Rules
/// - Must be > 0 (sale amounts, principals, payment amounts)
pub fn validate_positive_amount(field: &str, amount: Money) -> CoreResult<()> {
    if !amount.is_positive() {
        return Err(CoreError::invalid_amount(
            field,
            "must be a positive amount",
        ));
    }

    Ok(())
}

/// Validates a strictly positive point count.
pub fn validate_positive_points(points: i64) -> CoreResult<()> {
    if points <= 0 {
        return Err(CoreError::invalid_amount(
            "points",
            "must be a positive point count",
        ));
    }

    Ok(())
}

/// Validates an interest rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_interest_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "interest_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use sari_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("first_name", "Pedro").is_ok());
        assert!(validate_name("first_name", "").is_err());
        assert!(validate_name("first_name", "   ").is_err());
        assert!(validate_name("first_name", &"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("09171234567").is_ok());
        assert!(validate_phone("+63 917-123-4567").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone(&"9".repeat(30)).is_err());
    }

    #[test]
    fn test_validate_operator() {
        assert!(validate_operator("admin").is_ok());
        assert!(validate_operator("  ").is_err());
    }

    #[test]
    fn test_validate_positive_amount() {
        assert!(validate_positive_amount("amount", Money::from_cents(1)).is_ok());
        assert!(matches!(
            validate_positive_amount("amount", Money::zero()),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert!(matches!(
            validate_positive_amount("amount", Money::from_cents(-100)),
            Err(CoreError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_validate_positive_points() {
        assert!(validate_positive_points(1).is_ok());
        assert!(matches!(
            validate_positive_points(0),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert!(matches!(
            validate_positive_points(-50),
            Err(CoreError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_validate_interest_rate_bps() {
        assert!(validate_interest_rate_bps(0).is_ok());
        assert!(validate_interest_rate_bps(200).is_ok());
        assert!(validate_interest_rate_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
