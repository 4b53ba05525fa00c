//! Sale recording action.
//!
//! Thin orchestration over [`caravel_db::SaleRepository::record_sale`]:
//! resolve the caller, validate the input, run the transaction, then tell
//! the view cache which renderings went stale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use caravel_core::validation::{validate_quantity, validate_uuid};
use caravel_core::{Product, Sale, ValidationError};

use crate::actions::Actions;
use crate::safe_action::{safe_action, ActionState, Validate};
use crate::session::OrgSession;

// =============================================================================
// Input
// =============================================================================

/// Input for recording a sale of one of the caller's own products.
///
/// The price is not an input: the product's current selling price is
/// authoritative at sale time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaleInput {
    pub product_id: String,
    pub quantity: i64,
}

impl Validate for RecordSaleInput {
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

// =============================================================================
// Payload
// =============================================================================

/// A successfully recorded sale.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedSale {
    pub sale: Sale,
    pub updated_product: Product,
    pub message: String,
}

// =============================================================================
// Actions
// =============================================================================

impl Actions {
    /// Records a sale dated now.
    pub async fn record_sale(
        &self,
        caller: Option<&OrgSession>,
        input: RecordSaleInput,
    ) -> ActionState<RecordedSale> {
        self.record_sale_at(caller, input, Utc::now()).await
    }

    /// Records a sale dated at an explicit instant.
    ///
    /// The instant also selects the day/week/month aggregate buckets, so
    /// backfills and tests can target a fixed calendar position.
    pub async fn record_sale_at(
        &self,
        caller: Option<&OrgSession>,
        input: RecordSaleInput,
        sale_date: DateTime<Utc>,
    ) -> ActionState<RecordedSale> {
        let session = match Self::require_session(caller) {
            Ok(session) => session,
            Err(err) => return ActionState::error(err.to_string()),
        };

        safe_action(input, |input| async move {
            let outcome = self
                .db()
                .sales()
                .record_sale(&session.org_id, &input.product_id, input.quantity, sale_date)
                .await?;

            info!(
                sale_id = %outcome.sale.id,
                product_id = %outcome.product.id,
                quantity = input.quantity,
                "Sale recorded"
            );

            // Stock and listings changed; cached views of them are stale.
            self.views()
                .invalidate(&format!("/sales/{}", outcome.product.id));
            self.views().invalidate("/sales");
            self.views().invalidate("/inventory");

            let message = format!(
                "Successfully purchased {} units of {}",
                outcome.sale.quantity, outcome.product.name
            );

            Ok(RecordedSale {
                sale: outcome.sale,
                updated_product: outcome.product,
                message,
            })
        })
        .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use caravel_db::{Database, DbConfig};

    use crate::actions::test_support::{
        org_with_session, product_input, test_actions, RecordingViewCache,
    };
    use crate::session::{SessionManager, DEFAULT_SESSION_LIFETIME_SECS};

    #[tokio::test]
    async fn test_record_sale_envelope() {
        let actions = test_actions().await;
        let session = org_with_session(&actions, "sales@example.com").await;

        let product = actions
            .create_product(Some(&session), product_input("Wireless Headphones"))
            .await;
        let product = product.as_data().unwrap().clone();

        let state = actions
            .record_sale(
                Some(&session),
                RecordSaleInput {
                    product_id: product.id.clone(),
                    quantity: 3,
                },
            )
            .await;

        let recorded = state.as_data().unwrap();
        assert_eq!(recorded.sale.quantity, 3);
        assert_eq!(recorded.updated_product.stock, product.stock - 3);
        assert_eq!(
            recorded.message,
            "Successfully purchased 3 units of Wireless Headphones"
        );
    }

    #[tokio::test]
    async fn test_unauthenticated_and_invalid_input() {
        let actions = test_actions().await;
        let session = org_with_session(&actions, "sales@example.com").await;

        let no_session = actions
            .record_sale(
                None,
                RecordSaleInput {
                    product_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
                    quantity: 1,
                },
            )
            .await;
        assert_eq!(
            no_session.error_message(),
            Some("You must be logged in to perform this action.")
        );

        let bad_quantity = actions
            .record_sale(
                Some(&session),
                RecordSaleInput {
                    product_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
                    quantity: 0,
                },
            )
            .await;
        assert!(bad_quantity
            .as_field_errors()
            .unwrap()
            .contains_key("quantity"));
    }

    #[tokio::test]
    async fn test_insufficient_stock_message() {
        let actions = test_actions().await;
        let session = org_with_session(&actions, "sales@example.com").await;

        let mut input = product_input("Wireless Headphones");
        input.stock = 10;
        let product = actions.create_product(Some(&session), input).await;
        let product_id = product.as_data().unwrap().id.clone();

        actions
            .record_sale(
                Some(&session),
                RecordSaleInput {
                    product_id: product_id.clone(),
                    quantity: 3,
                },
            )
            .await;

        let state = actions
            .record_sale(
                Some(&session),
                RecordSaleInput {
                    product_id,
                    quantity: 8,
                },
            )
            .await;
        assert_eq!(
            state.error_message(),
            Some("Not enough stock. Only 7 units available.")
        );
    }

    #[tokio::test]
    async fn test_view_cache_notified() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = Arc::new(RecordingViewCache::default());
        let actions = Actions::with_view_cache(
            db,
            SessionManager::new("test-secret", DEFAULT_SESSION_LIFETIME_SECS),
            cache.clone(),
        );
        let session = org_with_session(&actions, "sales@example.com").await;

        let product = actions
            .create_product(Some(&session), product_input("Wireless Headphones"))
            .await;
        let product_id = product.as_data().unwrap().id.clone();
        cache.paths.lock().unwrap().clear();

        actions
            .record_sale(
                Some(&session),
                RecordSaleInput {
                    product_id: product_id.clone(),
                    quantity: 1,
                },
            )
            .await;

        let paths = cache.paths.lock().unwrap();
        assert_eq!(
            *paths,
            vec![
                format!("/sales/{product_id}"),
                "/sales".to_string(),
                "/inventory".to_string()
            ]
        );
    }
}
