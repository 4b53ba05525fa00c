//! # Notification Repository
//!
//! Persistence for the cross-organization purchase request workflow.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   requester (buyer)                       owner (seller)                │
//! │        │                                       │                        │
//! │        │  create ──────► PENDING ◄──── visible to both                  │
//! │        │                    │                  │                        │
//! │        │                    │   approve        │                        │
//! │        │                    ▼                  │                        │
//! │        │               PROCESSED  (terminal, exactly once)             │
//! │        │                                                                │
//! │   Approval records the sale (attributed to the BUYER) and flips the    │
//! │   status in ONE transaction: a crash cannot leave a sold-but-pending   │
//! │   or processed-but-unsold request behind.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Visibility
//! Every read filters on `from_org_id = caller OR to_org_id = caller`.
//! The predicate lives here, in the data-access layer, so no call site can
//! forget it.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::PRODUCT_COLUMNS;
use crate::repository::sale;
use caravel_core::{Notification, NotificationStatus, Product, Sale};

const NOTIFICATION_COLUMNS: &str = "\
    id, from_org_id, to_org_id, product_id, quantity, status, created_at, processed_at";

/// The result of approving a purchase request.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    /// The notification after its PENDING → PROCESSED transition.
    pub notification: Notification,
    /// The sale recorded on behalf of the requesting organization.
    pub sale: Sale,
}

/// Repository for notification database operations.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    /// Creates a PENDING purchase request from buyer to seller.
    ///
    /// This is a request only: stock and sales are untouched until
    /// approval.
    pub async fn create(
        &self,
        from_org_id: &str,
        to_org_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            from_org_id: from_org_id.to_string(),
            to_org_id: to_org_id.to_string(),
            product_id: product_id.to_string(),
            quantity,
            status: NotificationStatus::Pending,
            created_at: Utc::now(),
            processed_at: None,
        };

        debug!(
            id = %notification.id,
            from = %from_org_id,
            to = %to_org_id,
            "Creating purchase request"
        );

        sqlx::query(&format!(
            r#"
            INSERT INTO notifications ({NOTIFICATION_COLUMNS})
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#
        ))
        .bind(&notification.id)
        .bind(&notification.from_org_id)
        .bind(&notification.to_org_id)
        .bind(&notification.product_id)
        .bind(notification.quantity)
        .bind(notification.status)
        .bind(notification.created_at)
        .bind(notification.processed_at)
        .execute(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Lists the requests an organization can see (it is requester or
    /// product owner), newest first, with requester identity and a product
    /// snapshot joined in.
    pub async fn list_visible_to(&self, organization_id: &str) -> DbResult<Vec<NotificationFeedRow>> {
        let rows = sqlx::query_as::<_, NotificationFeedRow>(
            r#"
            SELECT
                n.id, n.quantity, n.status, n.created_at,
                f.name AS from_org_name,
                f.email AS from_org_email,
                p.id AS product_id,
                p.description AS product_description,
                p.selling_price_cents AS product_selling_price_cents
            FROM notifications n
            INNER JOIN organizations f ON f.id = n.from_org_id
            INNER JOIN products p ON p.id = n.product_id
            WHERE n.from_org_id = ?1 OR n.to_org_id = ?1
            ORDER BY n.created_at DESC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Fetches one request, if it is visible to the organization.
    pub async fn get_visible_to(
        &self,
        organization_id: &str,
        id: &str,
    ) -> DbResult<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE id = ?1 AND (from_org_id = ?2 OR to_org_id = ?2)
            "#
        ))
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Approves a PENDING request: records the sale on behalf of the
    /// requesting organization, then flips the status — all in one
    /// transaction keyed by the notification id.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - unknown id, or not visible to the caller
    /// * `DbError::AlreadyProcessed` - status is no longer PENDING
    /// * `DbError::InsufficientStock` - the seller cannot cover the
    ///   requested quantity
    pub async fn approve(
        &self,
        organization_id: &str,
        id: &str,
        sale_date: DateTime<Utc>,
    ) -> DbResult<ApprovalOutcome> {
        debug!(id = %id, caller = %organization_id, "Approving purchase request");

        let mut tx = self.pool.begin().await?;

        let mut notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE id = ?1 AND (from_org_id = ?2 OR to_org_id = ?2)
            "#
        ))
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Notification", id))?;

        if !notification.is_pending() {
            return Err(DbError::AlreadyProcessed { id: id.to_string() });
        }

        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(&notification.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", &notification.product_id))?;

        // Friendly early failure; the guarded decrement below re-checks
        // under the same transaction.
        if !product.has_stock_for(notification.quantity) {
            return Err(DbError::InsufficientStock {
                available: product.stock,
                requested: notification.quantity,
            });
        }

        // The sale belongs to the buyer: the requesting organization is
        // the one purchasing the units.
        let sale = sale::record_sale_on(
            &mut tx,
            &product,
            &notification.from_org_id,
            notification.quantity,
            sale_date,
        )
        .await?;

        let processed_at = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET status = ?1, processed_at = ?2
            WHERE id = ?3 AND status = ?4
            "#,
        )
        .bind(NotificationStatus::Processed)
        .bind(processed_at)
        .bind(id)
        .bind(NotificationStatus::Pending)
        .execute(&mut *tx)
        .await?;

        // A concurrent approval won the race; roll everything back.
        if result.rows_affected() == 0 {
            return Err(DbError::AlreadyProcessed { id: id.to_string() });
        }

        tx.commit().await?;

        notification.status = NotificationStatus::Processed;
        notification.processed_at = Some(processed_at);

        debug!(id = %id, sale_id = %sale.id, "Purchase request processed");

        Ok(ApprovalOutcome { notification, sale })
    }
}

// =============================================================================
// Row Types
// =============================================================================

/// A notification with requester identity and product snapshot, as listed
/// in the request feed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationFeedRow {
    pub id: String,
    pub quantity: i64,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
    pub from_org_name: String,
    pub from_org_email: String,
    pub product_id: String,
    pub product_description: String,
    pub product_selling_price_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::{demo_org, demo_product};

    async fn setup() -> (Database, String, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let seller = demo_org(&db, "seller@example.com").await;
        let buyer = demo_org(&db, "buyer@example.com").await;
        let product = demo_product(&db, &seller.id, 10_000, 6_000, 1_000, 10).await;
        (db, seller.id, buyer.id, product.id)
    }

    #[tokio::test]
    async fn test_request_then_approve_round_trip() {
        let (db, seller, buyer, product) = setup().await;
        let repo = db.notifications();

        let request = repo.create(&buyer, &seller, &product, 3).await.unwrap();

        // Visible to both sides, PENDING
        let status = repo
            .get_visible_to(&buyer, &request.id)
            .await
            .unwrap()
            .unwrap()
            .status;
        assert_eq!(status, NotificationStatus::Pending);

        // The request alone touches no stock
        assert_eq!(db.products().get(&product).await.unwrap().unwrap().stock, 10);

        let outcome = repo.approve(&seller, &request.id, Utc::now()).await.unwrap();
        assert_eq!(outcome.notification.status, NotificationStatus::Processed);
        assert!(outcome.notification.processed_at.is_some());

        // Sale attributed to the buyer, stock decremented on the seller's
        // product
        assert_eq!(outcome.sale.organization_id, buyer);
        assert_eq!(outcome.sale.total_amount_cents, 30_000);
        assert_eq!(db.products().get(&product).await.unwrap().unwrap().stock, 7);

        let status = repo
            .get_visible_to(&seller, &request.id)
            .await
            .unwrap()
            .unwrap()
            .status;
        assert_eq!(status, NotificationStatus::Processed);
    }

    #[tokio::test]
    async fn test_second_approval_is_rejected_without_side_effects() {
        let (db, seller, buyer, product) = setup().await;
        let repo = db.notifications();

        let request = repo.create(&buyer, &seller, &product, 3).await.unwrap();
        repo.approve(&seller, &request.id, Utc::now()).await.unwrap();

        let err = repo
            .approve(&seller, &request.id, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::AlreadyProcessed { .. }));

        // No double decrement, no second sale
        assert_eq!(db.products().get(&product).await.unwrap().unwrap().stock, 7);
        assert_eq!(db.sales().count_for_product(&product).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_approval_fails_when_stock_ran_out() {
        let (db, seller, buyer, product) = setup().await;
        let repo = db.notifications();

        let request = repo.create(&buyer, &seller, &product, 8).await.unwrap();

        // The seller sells 5 directly before approving; 5 remain.
        db.sales()
            .record_sale(&seller, &product, 5, Utc::now())
            .await
            .unwrap();

        let err = repo
            .approve(&seller, &request.id, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::InsufficientStock {
                available: 5,
                requested: 8
            }
        ));

        // Request stays PENDING and can be approved later
        let status = repo
            .get_visible_to(&seller, &request.id)
            .await
            .unwrap()
            .unwrap()
            .status;
        assert_eq!(status, NotificationStatus::Pending);
    }

    #[tokio::test]
    async fn test_visibility_is_limited_to_both_parties() {
        let (db, seller, buyer, product) = setup().await;
        let outsider = demo_org(&db, "outsider@example.com").await;
        let repo = db.notifications();

        let request = repo.create(&buyer, &seller, &product, 2).await.unwrap();

        assert_eq!(repo.list_visible_to(&seller).await.unwrap().len(), 1);
        assert_eq!(repo.list_visible_to(&buyer).await.unwrap().len(), 1);
        assert!(repo.list_visible_to(&outsider.id).await.unwrap().is_empty());

        assert!(repo
            .get_visible_to(&outsider.id, &request.id)
            .await
            .unwrap()
            .is_none());

        // An outsider cannot approve either
        let err = repo
            .approve(&outsider.id, &request.id, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_feed_row_shape() {
        let (db, seller, buyer, product) = setup().await;
        let repo = db.notifications();

        repo.create(&buyer, &seller, &product, 2).await.unwrap();

        let feed = repo.list_visible_to(&seller).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].from_org_email, "buyer@example.com");
        assert_eq!(feed[0].product_id, product);
        assert_eq!(feed[0].product_selling_price_cents, 10_000);
        assert_eq!(feed[0].status, NotificationStatus::Pending);
    }
}
