//! Organization session tokens.
//!
//! Issues and verifies HS256 JWTs carrying the authenticated
//! organization's identity. Cookie storage and transport integration are
//! someone else's job: this module only turns an `Organization` into a
//! signed token and a presented token back into an [`OrgSession`].
//!
//! Operations never read a session ambiently — the resolved `OrgSession`
//! is passed into every action explicitly, which also makes tests trivial
//! (construct one by hand, no token required).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ActionError;
use caravel_core::Organization;

/// Default session lifetime: 12 hours.
pub const DEFAULT_SESSION_LIFETIME_SECS: i64 = 43_200;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (organization id)
    pub sub: String,

    /// Organization display name
    pub org_name: String,

    /// Organization login email
    pub org_email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// The authenticated caller identity threaded through every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgSession {
    pub org_id: String,
    pub org_name: String,
    pub org_email: String,
}

impl OrgSession {
    /// Builds a session for an organization record, as done right after
    /// signup or login.
    pub fn for_organization(org: &Organization) -> Self {
        OrgSession {
            org_id: org.id.clone(),
            org_name: org.name.clone(),
            org_email: org.email.clone(),
        }
    }
}

/// Session token manager.
pub struct SessionManager {
    secret: String,
    lifetime_secs: i64,
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        SessionManager {
            secret: secret.into(),
            lifetime_secs,
        }
    }

    /// Issues a signed session token for an organization.
    pub fn issue(&self, org: &Organization) -> Result<String, ActionError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: org.id.clone(),
            org_name: org.name.clone(),
            org_email: org.email.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ActionError::internal("Failed to create session", e))
    }

    /// Verifies a token and extracts the session it represents.
    ///
    /// Returns `None` for missing, malformed, tampered or expired tokens —
    /// the caller treats all of those as "no session".
    pub fn verify(&self, token: &str) -> Option<OrgSession> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .ok()?;

        Some(OrgSession {
            org_id: token_data.claims.sub,
            org_name: token_data.claims.org_name,
            org_email: token_data.claims.org_email,
        })
    }

    /// Convenience for transports: resolves an optional bearer token into
    /// an optional session.
    pub fn resolve(&self, token: Option<&str>) -> Option<OrgSession> {
        token.and_then(|t| self.verify(t))
    }
}

/// Extract a bearer token from an Authorization header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

// =============================================================================
// Unit Tests
// =============================================================================
