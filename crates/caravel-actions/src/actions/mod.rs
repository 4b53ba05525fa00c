//! # Actions
//!
//! The operation surface, grouped by concern:
//!
//! - [`auth`] - signup, login, current organization
//! - [`product`] - catalog CRUD and the catalog sales snapshot
//! - [`sale`] - the atomic sale recording operation
//! - [`notification`] - the cross-organization purchase request workflow
//! - [`report`] - monthly sales and the year-over-year overview
//!
//! Every method takes the caller as `Option<&OrgSession>`; a `None` caller
//! produces the unauthenticated error inside the envelope rather than a
//! panic or a transport-level status.

use std::sync::Arc;

use caravel_db::Database;

use crate::error::{ActionError, ActionResult};
use crate::session::{OrgSession, SessionManager};
use crate::views::{NoopViewCache, ViewCache};

pub mod auth;
pub mod notification;
pub mod product;
pub mod report;
pub mod sale;

/// The action surface: owns the database handle, the session manager and
/// the view-cache seam.
pub struct Actions {
    db: Database,
    sessions: SessionManager,
    views: Arc<dyn ViewCache>,
}

impl Actions {
    /// Creates the action surface with no view cache attached.
    pub fn new(db: Database, sessions: SessionManager) -> Self {
        Actions {
            db,
            sessions,
            views: Arc::new(NoopViewCache),
        }
    }

    /// Creates the action surface with a view cache to notify after
    /// mutations.
    pub fn with_view_cache(
        db: Database,
        sessions: SessionManager,
        views: Arc<dyn ViewCache>,
    ) -> Self {
        Actions {
            db,
            sessions,
            views,
        }
    }

    /// The underlying database handle.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// The session manager, for transports that resolve tokens.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub(crate) fn views(&self) -> &dyn ViewCache {
        self.views.as_ref()
    }

    /// The session-or-unauthenticated gate every mutating operation runs
    /// through.
    pub(crate) fn require_session<'a>(
        caller: Option<&'a OrgSession>,
    ) -> ActionResult<&'a OrgSession> {
        caller.ok_or(ActionError::Unauthenticated)
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use caravel_db::{Database, DbConfig};

    use super::auth::SignupInput;
    use super::product::ProductInput;
    use super::Actions;
    use crate::session::{OrgSession, SessionManager, DEFAULT_SESSION_LIFETIME_SECS};
    use crate::views::ViewCache;
    use caravel_core::{ProductCategory, Region, Season};

    /// An action surface over a fresh in-memory database.
    pub(crate) async fn test_actions() -> Actions {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sessions = SessionManager::new("test-secret", DEFAULT_SESSION_LIFETIME_SECS);
        Actions::new(db, sessions)
    }

    /// A fabricated caller identity, bypassing token issuance.
    pub(crate) fn fake_session(org_id: &str) -> OrgSession {
        OrgSession {
            org_id: org_id.to_string(),
            org_name: format!("Org {org_id}"),
            org_email: format!("{org_id}@example.com"),
        }
    }

    /// Signs up a real organization and returns its session.
    pub(crate) async fn org_with_session(actions: &Actions, email: &str) -> OrgSession {
        let state = actions
            .signup(SignupInput {
                org_name: "Demo Organization".to_string(),
                org_email: email.to_string(),
                password: "correct horse".to_string(),
            })
            .await;
        OrgSession::for_organization(&state.as_data().unwrap().organization)
    }

    /// A complete, valid product form.
    pub(crate) fn product_input(name: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            description: "Noise cancelling over-ear headphones".to_string(),
            brand: Some("TechAudio".to_string()),
            category: ProductCategory::Electronics,
            sub_category: "Audio".to_string(),
            season: Season::AllYear,
            region: Region::North,
            warehouse_id: 1,
            leadtime_days: 5,
            supplier_reliability: 0.9,
            transport_cost_cents: 1_500,
            supplier_name: "TechSuppliers Inc".to_string(),
            supplier_contact: "+1-555-123-4567".to_string(),
            supplier_address: "123 Supplier St".to_string(),
            selling_price_cents: 19_999,
            cost_price_cents: 12_000,
            tax_rate_bps: 1_000,
            promotion_bps: 0,
            stock: 100,
            reorder_point: 20,
            weight: Some(250.0),
            dimensions: None,
            image: None,
            expiry_date: None,
            is_active: true,
            is_featured: false,
        }
    }

    /// A view cache that records invalidated paths.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingViewCache {
        pub paths: Mutex<Vec<String>>,
    }

    impl ViewCache for RecordingViewCache {
        fn invalidate(&self, path: &str) {
            self.paths.lock().unwrap().push(path.to_string());
        }
    }
}
