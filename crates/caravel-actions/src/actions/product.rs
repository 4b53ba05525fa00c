//! Product catalog actions.
//!
//! Create, list and fetch are all scoped to the calling organization.
//! There is deliberately no update or delete: catalog edits are not part
//! of the current surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use caravel_core::validation::{
    validate_non_negative, validate_price_cents, validate_required_text, validate_tax_rate_bps,
    validate_unit_interval,
};
use caravel_core::{Product, ProductCategory, Region, Season, ValidationError};

use crate::actions::Actions;
use crate::error::ActionError;
use crate::safe_action::{safe_action, ActionState, Validate};
use crate::session::OrgSession;

// =============================================================================
// Input
// =============================================================================

/// The canonical product form.
///
/// Classification (category/sub-category/season/region), supply chain
/// (warehouse, lead time, supplier, transport) and commerce fields are all
/// part of one schema; there are no alternative shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub brand: Option<String>,

    pub category: ProductCategory,
    pub sub_category: String,
    pub season: Season,
    pub region: Region,

    pub warehouse_id: i64,
    #[serde(default)]
    pub leadtime_days: i64,
    pub supplier_reliability: f64,
    #[serde(default)]
    pub transport_cost_cents: i64,
    pub supplier_name: String,
    pub supplier_contact: String,
    pub supplier_address: String,

    pub selling_price_cents: i64,
    pub cost_price_cents: i64,
    #[serde(default)]
    pub tax_rate_bps: u32,
    #[serde(default)]
    pub promotion_bps: u32,
    pub stock: i64,
    #[serde(default)]
    pub reorder_point: i64,

    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
}

fn default_true() -> bool {
    true
}

impl Validate for ProductInput {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let required = [
            ("name", &self.name, 200usize),
            ("description", &self.description, 2_000),
            ("subCategory", &self.sub_category, 100),
            ("supplierName", &self.supplier_name, 200),
            ("supplierContact", &self.supplier_contact, 200),
            ("supplierAddress", &self.supplier_address, 500),
        ];
        for (field, value, max) in required {
            if let Err(e) = validate_required_text(field, value, max) {
                errors.push(e);
            }
        }

        if self.warehouse_id < 1 {
            errors.push(ValidationError::MustBePositive {
                field: "warehouseId".to_string(),
            });
        }
        if let Err(e) = validate_non_negative("leadtimeDays", self.leadtime_days) {
            errors.push(e);
        }
        if let Err(e) = validate_unit_interval("supplierReliability", self.supplier_reliability) {
            errors.push(e);
        }
        if let Err(e) = validate_price_cents("transportCostCents", self.transport_cost_cents) {
            errors.push(e);
        }
        if let Err(e) = validate_price_cents("sellingPriceCents", self.selling_price_cents) {
            errors.push(e);
        }
        if let Err(e) = validate_price_cents("costPriceCents", self.cost_price_cents) {
            errors.push(e);
        }
        if let Err(e) = validate_tax_rate_bps(self.tax_rate_bps) {
            errors.push(e);
        }
        if self.promotion_bps > 10_000 {
            errors.push(ValidationError::OutOfRange {
                field: "promotionBps".to_string(),
                min: 0,
                max: 10_000,
            });
        }
        if let Err(e) = validate_non_negative("stock", self.stock) {
            errors.push(e);
        }
        if let Err(e) = validate_non_negative("reorderPoint", self.reorder_point) {
            errors.push(e);
        }
        if matches!(self.weight, Some(w) if w < 0.0) {
            errors.push(ValidationError::MustBeNonNegative {
                field: "weight".to_string(),
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

/// Catalog-level sales totals, derived on read from the denormalized
/// product columns (`selling_price × total_sold`), not from sale rows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSalesData {
    pub total_revenue_cents: i64,
    pub total_cost_cents: i64,
    pub total_profit_cents: i64,
    pub total_units_sold: i64,
    pub product_count: usize,
}

// =============================================================================
// Actions
// =============================================================================

impl Actions {
    /// Creates a product owned by the calling organization.
    pub async fn create_product(
        &self,
        caller: Option<&OrgSession>,
        input: ProductInput,
    ) -> ActionState<Product> {
        let session = match Self::require_session(caller) {
            Ok(session) => session,
            Err(err) => return ActionState::error(err.to_string()),
        };

        safe_action(input, |input| async move {
            let now = Utc::now();
            let product = Product {
                id: Uuid::new_v4().to_string(),
                organization_id: session.org_id.clone(),
                name: input.name.trim().to_string(),
                description: input.description.trim().to_string(),
                brand: input.brand,
                category: input.category,
                sub_category: input.sub_category,
                season: input.season,
                region: input.region,
                warehouse_id: input.warehouse_id,
                leadtime_days: input.leadtime_days,
                supplier_reliability: input.supplier_reliability,
                transport_cost_cents: input.transport_cost_cents,
                supplier_name: Some(input.supplier_name),
                supplier_contact: Some(input.supplier_contact),
                supplier_address: input.supplier_address,
                selling_price_cents: input.selling_price_cents,
                cost_price_cents: input.cost_price_cents,
                tax_rate_bps: input.tax_rate_bps,
                promotion_bps: input.promotion_bps,
                stock: input.stock,
                total_sold: 0,
                reorder_point: input.reorder_point,
                weight: input.weight,
                dimensions: input.dimensions,
                image: input.image,
                expiry_date: input.expiry_date,
                is_active: input.is_active,
                is_featured: input.is_featured,
                created_at: now,
                updated_at: now,
            };

            self.db()
                .products()
                .insert(&product)
                .await
                .map_err(|e| ActionError::internal("Failed to create product", e))?;

            info!(product_id = %product.id, org_id = %session.org_id, "Product created");
            self.views().invalidate("/inventory");

            Ok(product)
        })
        .await
    }

    /// Lists the calling organization's products, newest first.
    pub async fn get_products(&self, caller: Option<&OrgSession>) -> ActionState<Vec<Product>> {
        ActionState::from_result(async {
            let session = Self::require_session(caller)?;
            let products = self
                .db()
                .products()
                .list_for_org(&session.org_id)
                .await
                .map_err(|e| ActionError::internal("Failed to fetch products", e))?;
            Ok(products)
        }
        .await)
    }

    /// Fetches one of the calling organization's products.
    pub async fn get_product(
        &self,
        caller: Option<&OrgSession>,
        product_id: &str,
    ) -> ActionState<Product> {
        ActionState::from_result(async {
            let session = Self::require_session(caller)?;
            let product = self
                .db()
                .products()
                .get_for_org(&session.org_id, product_id)
                .await?
                .ok_or_else(|| ActionError::NotFound("Product".to_string()))?;
            Ok(product)
        }
        .await)
    }

    /// Catalog-level sales totals for the calling organization.
    pub async fn get_sales_data(
        &self,
        caller: Option<&OrgSession>,
    ) -> ActionState<CatalogSalesData> {
        ActionState::from_result(async {
            let session = Self::require_session(caller)?;
            let rows = self
                .db()
                .products()
                .sales_snapshot(&session.org_id)
                .await
                .map_err(|e| ActionError::internal("Failed to fetch sales data", e))?;

            let total_revenue_cents: i64 = rows
                .iter()
                .map(|p| p.selling_price_cents * p.total_sold)
                .sum();
            let total_cost_cents: i64 = rows
                .iter()
                .map(|p| p.cost_price_cents * p.total_sold)
                .sum();

            Ok(CatalogSalesData {
                total_revenue_cents,
                total_cost_cents,
                total_profit_cents: total_revenue_cents - total_cost_cents,
                total_units_sold: rows.iter().map(|p| p.total_sold).sum(),
                product_count: rows.len(),
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
    use crate::actions::test_support::{
        fake_session, org_with_session, product_input, test_actions,
    };

    #[tokio::test]
    async fn test_create_and_list() {
        let actions = test_actions().await;
        let session = org_with_session(&actions, "catalog@example.com").await;

        let created = actions
            .create_product(Some(&session), product_input("Wireless Headphones"))
            .await;
        let created = created.as_data().unwrap();
        assert_eq!(created.organization_id, session.org_id);
        assert_eq!(created.total_sold, 0);

        let listed = actions.get_products(Some(&session)).await;
        assert_eq!(listed.as_data().unwrap().len(), 1);

        let fetched = actions.get_product(Some(&session), &created.id).await;
        assert_eq!(fetched.as_data().unwrap().name, "Wireless Headphones");
    }

    #[tokio::test]
    async fn test_create_requires_session() {
        let actions = test_actions().await;
        let state = actions
            .create_product(None, product_input("Wireless Headphones"))
            .await;
        assert_eq!(
            state.error_message(),
            Some("You must be logged in to perform this action.")
        );
    }

    #[tokio::test]
    async fn test_field_errors_collected() {
        let actions = test_actions().await;
        let session = org_with_session(&actions, "catalog@example.com").await;

        let mut input = product_input("");
        input.supplier_reliability = 1.5;
        input.selling_price_cents = -1;

        let state = actions.create_product(Some(&session), input).await;
        let fields = state.as_field_errors().unwrap();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("supplierReliability"));
        assert!(fields.contains_key("sellingPriceCents"));
    }

    #[tokio::test]
    async fn test_product_invisible_across_tenants() {
        let actions = test_actions().await;
        let seller = org_with_session(&actions, "seller@example.com").await;
        let other = org_with_session(&actions, "other@example.com").await;

        let created = actions
            .create_product(Some(&seller), product_input("Wireless Headphones"))
            .await;
        let product_id = created.as_data().unwrap().id.clone();

        let state = actions.get_product(Some(&other), &product_id).await;
        assert_eq!(state.error_message(), Some("Product not found."));
    }

    #[tokio::test]
    async fn test_sales_data_totals() {
        let actions = test_actions().await;
        let session = org_with_session(&actions, "catalog@example.com").await;

        let created = actions
            .create_product(Some(&session), product_input("Wireless Headphones"))
            .await;
        let product = created.as_data().unwrap();

        // Sell 3 units so total_sold is non-zero
        actions
            .db()
            .sales()
            .record_sale(&session.org_id, &product.id, 3, Utc::now())
            .await
            .unwrap();

        let data = actions.get_sales_data(Some(&session)).await;
        let data = data.as_data().unwrap();
        assert_eq!(data.total_units_sold, 3);
        assert_eq!(data.total_revenue_cents, 3 * 19_999);
        assert_eq!(data.total_cost_cents, 3 * 12_000);
        assert_eq!(data.total_profit_cents, 3 * (19_999 - 12_000));
        assert_eq!(data.product_count, 1);
    }

    #[tokio::test]
    async fn test_unused_session_is_ignored() {
        // A fabricated session with no backing organization still fails
        // cleanly on reads.
        let actions = test_actions().await;
        let ghost = fake_session("ghost-org");
        let state = actions.get_products(Some(&ghost)).await;
        assert_eq!(state.as_data().map(Vec::len), Some(0));
    }
}
