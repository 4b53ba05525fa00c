//! The validate-then-handle wrapper.
//!
//! A safe action takes untrusted input, runs its validation rules, and
//! either reports per-field failures or invokes the handler — normalizing
//! the outcome into exactly one of three shapes:
//!
//! ```json
//! { "data": ... }
//! { "error": "Not enough stock. Only 7 units available." }
//! { "fieldErrors": { "quantity": ["quantity must be positive"] } }
//! ```
//!
//! Field errors are reserved for schema-level input problems shown next to
//! form fields; business failures arrive as a single `error` string.

use std::collections::BTreeMap;
use std::future::Future;

use serde::Serialize;

use crate::error::{ActionError, ActionResult};
use caravel_core::ValidationError;

/// Per-field validation messages, keyed by form field name.
///
/// BTreeMap keeps serialization order stable.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

// =============================================================================
// Action State
// =============================================================================

/// The tri-state result of a safe action.
///
/// Serializes as `{data}`, `{error}` or `{fieldErrors}` — never more than
/// one of them.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ActionState<T> {
    Data {
        data: T,
    },
    Error {
        error: String,
    },
    FieldErrors {
        #[serde(rename = "fieldErrors")]
        field_errors: FieldErrors,
    },
}

impl<T> ActionState<T> {
    /// Success carrying the handler's payload.
    pub fn data(data: T) -> Self {
        ActionState::Data { data }
    }

    /// Business failure with a single display message.
    pub fn error(message: impl Into<String>) -> Self {
        ActionState::Error {
            error: message.into(),
        }
    }

    /// Schema-level failure with per-field messages.
    pub fn field_errors(field_errors: FieldErrors) -> Self {
        ActionState::FieldErrors { field_errors }
    }

    /// Collapses a handler result into the envelope.
    pub fn from_result(result: ActionResult<T>) -> Self {
        match result {
            Ok(data) => ActionState::data(data),
            Err(err) => ActionState::error(err.to_string()),
        }
    }

    /// The success payload, if any.
    pub fn as_data(&self) -> Option<&T> {
        match self {
            ActionState::Data { data } => Some(data),
            _ => None,
        }
    }

    /// The error message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ActionState::Error { error } => Some(error),
            _ => None,
        }
    }

    /// The per-field messages, if any.
    pub fn as_field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ActionState::FieldErrors { field_errors } => Some(field_errors),
            _ => None,
        }
    }

    /// True when the action succeeded.
    pub fn is_data(&self) -> bool {
        matches!(self, ActionState::Data { .. })
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Schema validation for action inputs.
///
/// Implementations collect every failure rather than stopping at the
/// first, so the caller can render all invalid fields at once.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<ValidationError>>;
}

/// Groups validation failures into per-field message lists.
pub fn group_by_field(errors: Vec<ValidationError>) -> FieldErrors {
    let mut grouped: FieldErrors = BTreeMap::new();
    for err in errors {
        grouped
            .entry(err.field().to_string())
            .or_default()
            .push(err.to_string());
    }
    grouped
}

/// Runs `handler` on `input` after validation.
///
/// ## Contract
/// - Validation failures short-circuit into `{fieldErrors}`; the handler
///   never sees invalid input.
/// - Handler errors become `{error}` with their display message; typed
///   [`ActionError`]s render user-facing text, internals have already been
///   reduced to a generic message.
pub async fn safe_action<I, T, F, Fut>(input: I, handler: F) -> ActionState<T>
where
    I: Validate,
    F: FnOnce(I) -> Fut,
    Fut: Future<Output = ActionResult<T>>,
{
    if let Err(errors) = input.validate() {
        return ActionState::field_errors(group_by_field(errors));
    }

    ActionState::from_result(handler(input).await)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use caravel_core::validation::validate_quantity;

    struct QtyInput {
        quantity: i64,
    }

    impl Validate for QtyInput {
        fn validate(&self) -> Result<(), Vec<ValidationError>> {
            let mut errors = Vec::new();
            if let Err(e) = validate_quantity(self.quantity) {
                errors.push(e);
            }
            if errors.is_empty() {
                Ok(())
            } else {
                Err(errors)
            }
        }
    }

    #[tokio::test]
    async fn test_valid_input_reaches_handler() {
        let state = safe_action(QtyInput { quantity: 3 }, |input| async move {
            Ok(input.quantity * 2)
        })
        .await;

        assert_eq!(state.as_data(), Some(&6));
    }

    #[tokio::test]
    async fn test_invalid_input_short_circuits() {
        let state: ActionState<i64> = safe_action(QtyInput { quantity: 0 }, |_| async move {
            panic!("handler must not run on invalid input")
        })
        .await;

        let fields = state.as_field_errors().unwrap();
        assert_eq!(fields["quantity"], vec!["quantity must be positive"]);
    }

    #[tokio::test]
    async fn test_handler_error_becomes_message() {
        let state: ActionState<i64> = safe_action(QtyInput { quantity: 3 }, |_| async move {
            Err(ActionError::InsufficientStock { available: 7 })
        })
        .await;

        assert_eq!(
            state.error_message(),
            Some("Not enough stock. Only 7 units available.")
        );
    }

    #[test]
    fn test_envelope_serialization_shapes() {
        let data = serde_json::to_value(ActionState::data(5)).unwrap();
        assert_eq!(data, serde_json::json!({ "data": 5 }));

        let error = serde_json::to_value(ActionState::<i64>::error("nope")).unwrap();
        assert_eq!(error, serde_json::json!({ "error": "nope" }));

        let mut fields = FieldErrors::new();
        fields.insert("name".to_string(), vec!["name is required".to_string()]);
        let field_errors = serde_json::to_value(ActionState::<i64>::field_errors(fields)).unwrap();
        assert_eq!(
            field_errors,
            serde_json::json!({ "fieldErrors": { "name": ["name is required"] } })
        );
    }

    #[test]
    fn test_group_by_field_collects_multiple() {
        let errors = vec![
            ValidationError::Required {
                field: "name".to_string(),
            },
            ValidationError::MustBePositive {
                field: "quantity".to_string(),
            },
            ValidationError::TooLong {
                field: "name".to_string(),
                max: 10,
            },
        ];
        let grouped = group_by_field(errors);
        assert_eq!(grouped["name"].len(), 2);
        assert_eq!(grouped["quantity"].len(), 1);
    }
}
