//! Purchase request workflow actions.
//!
//! A buyer requests units of another organization's product; the request
//! sits PENDING until the seller approves it, at which point the sale is
//! recorded on the buyer's behalf and the request becomes PROCESSED.
//! Requests are visible only to the two organizations involved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use caravel_core::validation::{validate_quantity, validate_uuid};
use caravel_core::{Notification, NotificationStatus, Sale, ValidationError};
use caravel_db::repository::notification::NotificationFeedRow;

use crate::actions::Actions;
use crate::error::ActionError;
use crate::safe_action::{safe_action, ActionState, Validate};
use crate::session::OrgSession;

// =============================================================================
// Inputs
// =============================================================================

/// Input for requesting a purchase from another organization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPurchaseInput {
    pub product_id: String,
    pub quantity: i64,
}

impl Validate for RequestPurchaseInput {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Err(e) = validate_uuid("productId", &self.product_id) {
            errors.push(e);
        }
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

/// Input addressing an existing purchase request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationIdInput {
    pub notification_id: String,
}

impl Validate for NotificationIdInput {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        validate_uuid("notificationId", &self.notification_id).map_err(|e| vec![e])
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Acknowledgement of a created purchase request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequested {
    pub notification_id: String,
    pub message: String,
}

/// The result of an approved purchase request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedPurchase {
    pub notification: Notification,
    pub sale: Sale,
    pub message: String,
}

/// Acknowledgement of a rejection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionAck {
    pub notification_id: String,
    pub message: String,
}

/// Requester identity as shown in the feed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequesterIdentity {
    pub name: String,
    pub email: String,
}

/// Product snapshot as shown in the feed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedProduct {
    pub id: String,
    pub description: String,
    pub selling_price_cents: i64,
}

/// One entry of the purchase request feed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFeedItem {
    pub id: String,
    pub from_org: RequesterIdentity,
    pub product: RequestedProduct,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub status: NotificationStatus,
}

impl From<NotificationFeedRow> for NotificationFeedItem {
    fn from(row: NotificationFeedRow) -> Self {
        NotificationFeedItem {
            id: row.id,
            from_org: RequesterIdentity {
                name: row.from_org_name,
                email: row.from_org_email,
            },
            product: RequestedProduct {
                id: row.product_id,
                description: row.product_description,
                selling_price_cents: row.product_selling_price_cents,
            },
            quantity: row.quantity,
            created_at: row.created_at,
            status: row.status,
        }
    }
}

/// Current status of one purchase request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStatusView {
    pub status: NotificationStatus,
}

// =============================================================================
// Actions
// =============================================================================

impl Actions {
    /// Requests a purchase of another organization's product.
    ///
    /// The product lookup is deliberately unscoped: the whole point is
    /// buying across tenants. Stock and sales are untouched until the
    /// seller approves.
    pub async fn request_purchase(
        &self,
        caller: Option<&OrgSession>,
        input: RequestPurchaseInput,
    ) -> ActionState<PurchaseRequested> {
        let session = match Self::require_session(caller) {
            Ok(session) => session,
            Err(err) => return ActionState::error(err.to_string()),
        };

        safe_action(input, |input| async move {
            let product = self
                .db()
                .products()
                .get(&input.product_id)
                .await?
                .ok_or_else(|| ActionError::NotFound("Product".to_string()))?;

            let notification = self
                .db()
                .notifications()
                .create(
                    &session.org_id,
                    &product.organization_id,
                    &product.id,
                    input.quantity,
                )
                .await
                .map_err(|e| ActionError::internal("Failed to request purchase", e))?;

            info!(
                notification_id = %notification.id,
                buyer = %session.org_id,
                seller = %product.organization_id,
                "Purchase request created"
            );

            Ok(PurchaseRequested {
                notification_id: notification.id,
                message: "Purchase request sent to seller.".to_string(),
            })
        })
        .await
    }

    /// Approves a PENDING purchase request.
    ///
    /// Records the sale attributed to the requesting organization and
    /// flips the request to PROCESSED, atomically. A second approval of
    /// the same request fails without side effects.
    pub async fn approve_notification(
        &self,
        caller: Option<&OrgSession>,
        input: NotificationIdInput,
    ) -> ActionState<ApprovedPurchase> {
        let session = match Self::require_session(caller) {
            Ok(session) => session,
            Err(err) => return ActionState::error(err.to_string()),
        };

        safe_action(input, |input| async move {
            let outcome = self
                .db()
                .notifications()
                .approve(&session.org_id, &input.notification_id, Utc::now())
                .await?;

            info!(
                notification_id = %outcome.notification.id,
                sale_id = %outcome.sale.id,
                "Purchase request approved"
            );

            self.views()
                .invalidate(&format!("/sales/{}", outcome.sale.product_id));
            self.views().invalidate("/sales");
            self.views().invalidate("/inventory");

            Ok(ApprovedPurchase {
                notification: outcome.notification,
                sale: outcome.sale,
                message: "Purchase processed and sale recorded.".to_string(),
            })
        })
        .await
    }

    /// Declines a PENDING purchase request.
    ///
    /// No terminal REJECTED state is persisted yet: the request is left
    /// PENDING and only the acknowledgement differs.
    /// TODO: persist a REJECTED transition once the workflow decision on
    /// rejection semantics (terminal state vs. deletion) lands.
    pub async fn reject_notification(
        &self,
        caller: Option<&OrgSession>,
        input: NotificationIdInput,
    ) -> ActionState<RejectionAck> {
        let session = match Self::require_session(caller) {
            Ok(session) => session,
            Err(err) => return ActionState::error(err.to_string()),
        };

        safe_action(input, |input| async move {
            let notification = self
                .db()
                .notifications()
                .get_visible_to(&session.org_id, &input.notification_id)
                .await?
                .ok_or_else(|| ActionError::NotFound("Notification".to_string()))?;

            if !notification.is_pending() {
                return Err(ActionError::AlreadyProcessed);
            }

            info!(
                notification_id = %notification.id,
                "Purchase request rejection acknowledged (not persisted)"
            );

            Ok(RejectionAck {
                notification_id: notification.id,
                message: "Rejection noted. The request remains pending.".to_string(),
            })
        })
        .await
    }

    /// The purchase request feed: everything the calling organization sent
    /// or received, newest first.
    pub async fn list_notifications(
        &self,
        caller: Option<&OrgSession>,
    ) -> ActionState<Vec<NotificationFeedItem>> {
        ActionState::from_result(async {
            let session = Self::require_session(caller)?;
            let rows = self
                .db()
                .notifications()
                .list_visible_to(&session.org_id)
                .await
                .map_err(|e| ActionError::internal("Failed to fetch notifications", e))?;
            Ok(rows.into_iter().map(NotificationFeedItem::from).collect())
        }
        .await)
    }

    /// The current status of one purchase request.
    pub async fn notification_status(
        &self,
        caller: Option<&OrgSession>,
        notification_id: &str,
    ) -> ActionState<NotificationStatusView> {
        ActionState::from_result(async {
            let session = Self::require_session(caller)?;
            let notification = self
                .db()
                .notifications()
                .get_visible_to(&session.org_id, notification_id)
                .await?
                .ok_or_else(|| ActionError::NotFound("Notification".to_string()))?;
            Ok(NotificationStatusView {
                status: notification.status,
            })
        }
        .await)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{org_with_session, product_input, test_actions};

    /// Seller with a product, buyer with nothing.
    async fn marketplace(actions: &Actions) -> (OrgSession, OrgSession, String) {
        let seller = org_with_session(actions, "seller@example.com").await;
        let buyer = org_with_session(actions, "buyer@example.com").await;

        let mut input = product_input("Wireless Headphones");
        input.stock = 10;
        let product = actions.create_product(Some(&seller), input).await;
        let product_id = product.as_data().unwrap().id.clone();

        (seller, buyer, product_id)
    }

    #[tokio::test]
    async fn test_request_approve_round_trip() {
        let actions = test_actions().await;
        let (seller, buyer, product_id) = marketplace(&actions).await;

        let requested = actions
            .request_purchase(
                Some(&buyer),
                RequestPurchaseInput {
                    product_id: product_id.clone(),
                    quantity: 3,
                },
            )
            .await;
        let requested = requested.as_data().unwrap();
        assert_eq!(requested.message, "Purchase request sent to seller.");

        // Immediately after the request: PENDING, stock untouched
        let status = actions
            .notification_status(Some(&buyer), &requested.notification_id)
            .await;
        assert_eq!(
            status.as_data().unwrap().status,
            NotificationStatus::Pending
        );
        let product = actions.get_product(Some(&seller), &product_id).await;
        assert_eq!(product.as_data().unwrap().stock, 10);

        // Seller approves: sale recorded for the buyer, stock drops
        let approved = actions
            .approve_notification(
                Some(&seller),
                NotificationIdInput {
                    notification_id: requested.notification_id.clone(),
                },
            )
            .await;
        let approved = approved.as_data().unwrap();
        assert_eq!(approved.sale.organization_id, buyer.org_id);
        assert_eq!(approved.sale.quantity, 3);

        let status = actions
            .notification_status(Some(&seller), &requested.notification_id)
            .await;
        assert_eq!(
            status.as_data().unwrap().status,
            NotificationStatus::Processed
        );
        let product = actions.get_product(Some(&seller), &product_id).await;
        assert_eq!(product.as_data().unwrap().stock, 7);
    }

    #[tokio::test]
    async fn test_double_approval_rejected() {
        let actions = test_actions().await;
        let (seller, buyer, product_id) = marketplace(&actions).await;

        let requested = actions
            .request_purchase(
                Some(&buyer),
                RequestPurchaseInput {
                    product_id,
                    quantity: 2,
                },
            )
            .await;
        let id = requested.as_data().unwrap().notification_id.clone();

        actions
            .approve_notification(
                Some(&seller),
                NotificationIdInput {
                    notification_id: id.clone(),
                },
            )
            .await;

        let again = actions
            .approve_notification(Some(&seller), NotificationIdInput { notification_id: id })
            .await;
        assert_eq!(
            again.error_message(),
            Some("Notification already processed.")
        );
    }

    #[tokio::test]
    async fn test_rejection_is_acknowledged_but_not_persisted() {
        let actions = test_actions().await;
        let (seller, buyer, product_id) = marketplace(&actions).await;

        let requested = actions
            .request_purchase(
                Some(&buyer),
                RequestPurchaseInput {
                    product_id,
                    quantity: 2,
                },
            )
            .await;
        let id = requested.as_data().unwrap().notification_id.clone();

        let rejected = actions
            .reject_notification(
                Some(&seller),
                NotificationIdInput {
                    notification_id: id.clone(),
                },
            )
            .await;
        assert!(rejected.is_data());

        // Still PENDING: rejection has no persisted transition yet
        let status = actions.notification_status(Some(&seller), &id).await;
        assert_eq!(
            status.as_data().unwrap().status,
            NotificationStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_feed_is_scoped_and_shaped() {
        let actions = test_actions().await;
        let (seller, buyer, product_id) = marketplace(&actions).await;
        let outsider = org_with_session(&actions, "outsider@example.com").await;

        actions
            .request_purchase(
                Some(&buyer),
                RequestPurchaseInput {
                    product_id: product_id.clone(),
                    quantity: 2,
                },
            )
            .await;

        let seller_feed = actions.list_notifications(Some(&seller)).await;
        let seller_feed = seller_feed.as_data().unwrap();
        assert_eq!(seller_feed.len(), 1);
        assert_eq!(seller_feed[0].from_org.email, "buyer@example.com");
        assert_eq!(seller_feed[0].product.id, product_id);
        assert_eq!(seller_feed[0].product.selling_price_cents, 19_999);

        let outsider_feed = actions.list_notifications(Some(&outsider)).await;
        assert!(outsider_feed.as_data().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_invisible_to_outsiders() {
        let actions = test_actions().await;
        let (_seller, buyer, product_id) = marketplace(&actions).await;
        let outsider = org_with_session(&actions, "outsider@example.com").await;

        let requested = actions
            .request_purchase(
                Some(&buyer),
                RequestPurchaseInput {
                    product_id,
                    quantity: 1,
                },
            )
            .await;
        let id = requested.as_data().unwrap().notification_id.clone();

        let state = actions.notification_status(Some(&outsider), &id).await;
        assert_eq!(state.error_message(), Some("Notification not found."));
    }

    #[tokio::test]
    async fn test_request_unknown_product() {
        let actions = test_actions().await;
        let buyer = org_with_session(&actions, "buyer@example.com").await;

        let state = actions
            .request_purchase(
                Some(&buyer),
                RequestPurchaseInput {
                    product_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
                    quantity: 1,
                },
            )
            .await;
        assert_eq!(state.error_message(), Some("Product not found."));
    }
}
