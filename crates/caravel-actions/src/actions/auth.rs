//! Identity actions: signup, login, current organization.
//!
//! Passwords are stored as argon2 hashes with per-hash salts; login
//! verifies against the hash and returns a signed session token. Unknown
//! email and wrong password produce the same error message.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use caravel_core::validation::{validate_email, validate_password, validate_required_text};
use caravel_core::{Organization, ValidationError};

use crate::actions::Actions;
use crate::error::ActionError;
use crate::safe_action::{safe_action, ActionState, Validate};
use crate::session::OrgSession;

// =============================================================================
// Inputs
// =============================================================================

/// Signup form input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    pub org_name: String,
    pub org_email: String,
    pub password: String,
}

impl Validate for SignupInput {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Err(e) = validate_required_text("orgName", &self.org_name, 200) {
            errors.push(e);
        }
        if let Err(e) = validate_email(&self.org_email) {
            errors.push(e);
        }
        if let Err(e) = validate_password(&self.password) {
            errors.push(e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Login form input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub org_email: String,
    pub password: String,
}

impl Validate for LoginInput {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Err(e) = validate_email(&self.org_email) {
            errors.push(e);
        }
        if self.password.is_empty() {
            errors.push(ValidationError::Required {
                field: "password".to_string(),
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// A signed-in organization plus its session token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub organization: Organization,
    pub token: String,
}

/// The profile slice shown in settings views.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgProfile {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
}

// =============================================================================
// Actions
// =============================================================================

impl Actions {
    /// Registers a new organization and signs it in.
    pub async fn signup(&self, input: SignupInput) -> ActionState<AuthPayload> {
        safe_action(input, |input| async move {
            let org = Organization {
                id: Uuid::new_v4().to_string(),
                name: input.org_name.trim().to_string(),
                email: input.org_email.trim().to_lowercase(),
                password_hash: hash_password(&input.password)?,
                address: None,
                created_at: Utc::now(),
            };

            self.db().organizations().insert(&org).await?;

            let token = self.sessions().issue(&org)?;
            info!(org_id = %org.id, "Organization signed up");

            Ok(AuthPayload {
                organization: org,
                token,
            })
        })
        .await
    }

    /// Signs an organization in by email and password.
    pub async fn login(&self, input: LoginInput) -> ActionState<AuthPayload> {
        safe_action(input, |input| async move {
            let email = input.org_email.trim().to_lowercase();

            let org = self
                .db()
                .organizations()
                .find_by_email(&email)
                .await?
                .ok_or(ActionError::InvalidCredentials)?;

            if !verify_password(&input.password, &org.password_hash) {
                return Err(ActionError::InvalidCredentials);
            }

            let token = self.sessions().issue(&org)?;
            info!(org_id = %org.id, "Organization logged in");

            Ok(AuthPayload {
                organization: org,
                token,
            })
        })
        .await
    }

    /// The calling organization's profile.
    pub async fn current_org(&self, caller: Option<&OrgSession>) -> ActionState<OrgProfile> {
        ActionState::from_result(async {
            let session = Self::require_session(caller)?;

            let org = self
                .db()
                .organizations()
                .get(&session.org_id)
                .await?
                .ok_or_else(|| ActionError::NotFound("Organization".to_string()))?;

            Ok(OrgProfile {
                name: org.name,
                email: org.email,
                address: org.address,
            })
        }
        .await)
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a password for storage.
fn hash_password(password: &str) -> Result<String, ActionError> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ActionError::internal("Failed to create account", e))
}

/// Verify a password against its stored hash.
fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================
