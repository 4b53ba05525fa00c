//! # Error Types
//!
//! Domain-specific error types for caravel-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  caravel-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  caravel-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  caravel-actions errors (separate crate)                               │
//! │  └── ActionError      - What callers of the action layer see           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ActionError → caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (id, remaining stock, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are caught at the
/// action boundary and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No authenticated organization resolved for the call.
    #[error("You must be logged in to perform this action.")]
    Unauthenticated,

    /// Product cannot be found, or is not visible to the caller's
    /// organization.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Purchase request cannot be found, or is not visible to the caller's
    /// organization.
    #[error("Notification not found: {0}")]
    NotificationNotFound(String),

    /// Requested quantity exceeds available stock.
    ///
    /// The message reports what is still available so the caller can adjust
    /// the quantity.
    #[error("Not enough stock. Only {available} units available.")]
    InsufficientStock { available: i64, requested: i64 },

    /// The purchase request has already left the PENDING state.
    #[error("Notification already processed.")]
    AlreadyProcessed { notification_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements. Used for early
/// validation before business logic runs; the action layer groups them into
/// per-field message lists.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Fraction fields (e.g. supplier reliability) live in [0, 1].
    #[error("{field} must be between 0 and 1")]
    OutOfUnitInterval { field: String },

    /// Invalid format (e.g. invalid UUID, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. an email already registered).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// The form field this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustBeNonNegative { field }
            | ValidationError::OutOfUnitInterval { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message_reports_remaining() {
        let err = CoreError::InsufficientStock {
            available: 7,
            requested: 8,
        };
        assert_eq!(err.to_string(), "Not enough stock. Only 7 units available.");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
        assert_eq!(err.field(), "name");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        };
        assert_eq!(err.to_string(), "password must be at least 8 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
