//! Action boundary errors.
//!
//! `ActionError` is the last typed stop before an error becomes the string
//! inside `{ error: "..." }`. Typed variants render their own user-facing
//! message; anything unexpected is logged here and reduced to a generic
//! retry suggestion so internals never cross the boundary.

use thiserror::Error;

use caravel_db::DbError;

/// Errors surfaced by action handlers.
#[derive(Debug, Error)]
pub enum ActionError {
    /// No authenticated organization for the call.
    #[error("You must be logged in to perform this action.")]
    Unauthenticated,

    /// Entity absent, or not visible to the caller's organization.
    /// The payload is the entity label ("Product", "Notification").
    #[error("{0} not found.")]
    NotFound(String),

    /// Requested quantity exceeds what is on hand.
    #[error("Not enough stock. Only {available} units available.")]
    InsufficientStock { available: i64 },

    /// The purchase request already left the PENDING state.
    #[error("Notification already processed.")]
    AlreadyProcessed,

    /// Login failed. One message for both unknown email and wrong
    /// password, so the response doesn't reveal which accounts exist.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// A uniqueness rule was violated (e.g. an email already registered).
    #[error("{field} '{value}' is already registered.")]
    Duplicate { field: String, value: String },

    /// Anything unexpected. `context` is a short, user-safe description of
    /// the operation that failed; the underlying cause has already been
    /// logged.
    #[error("{context}. Please try again.")]
    Internal { context: String },
}

impl ActionError {
    /// Wraps an unexpected failure: logs the cause, keeps only a
    /// user-safe context string.
    pub fn internal(context: &str, cause: impl std::fmt::Display) -> Self {
        tracing::error!(context = %context, cause = %cause, "Action failed unexpectedly");
        ActionError::Internal {
            context: context.to_string(),
        }
    }
}

/// Converts database errors to action errors.
///
/// Typed database failures map one-to-one; everything else is logged and
/// reduced to the generic message.
impl From<DbError> for ActionError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, .. } => ActionError::NotFound(entity),
            DbError::InsufficientStock { available, .. } => {
                ActionError::InsufficientStock { available }
            }
            DbError::AlreadyProcessed { .. } => ActionError::AlreadyProcessed,
            DbError::UniqueViolation { field, value } => ActionError::Duplicate { field, value },
            other => ActionError::internal("Something went wrong", other),
        }
    }
}

/// Result type for action handlers.
pub type ActionResult<T> = Result<T, ActionError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            ActionError::Unauthenticated.to_string(),
            "You must be logged in to perform this action."
        );
        assert_eq!(
            ActionError::NotFound("Product".to_string()).to_string(),
            "Product not found."
        );
        assert_eq!(
            ActionError::InsufficientStock { available: 7 }.to_string(),
            "Not enough stock. Only 7 units available."
        );
        assert_eq!(
            ActionError::Internal {
                context: "Failed to process purchase".to_string()
            }
            .to_string(),
            "Failed to process purchase. Please try again."
        );
    }

    #[test]
    fn test_db_error_mapping() {
        let err: ActionError = DbError::InsufficientStock {
            available: 3,
            requested: 5,
        }
        .into();
        assert!(matches!(
            err,
            ActionError::InsufficientStock { available: 3 }
        ));

        let err: ActionError = DbError::QueryFailed("boom".to_string()).into();
        assert!(matches!(err, ActionError::Internal { .. }));
    }
}
