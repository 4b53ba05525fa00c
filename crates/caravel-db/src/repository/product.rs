//! # Product Repository
//!
//! Database operations for catalog products.
//!
//! ## Tenancy
//! Every read here is scoped to an owning organization except [`get`],
//! which exists for the cross-organization purchase flow: a buyer looks up
//! another tenant's product to discover its seller. Stock and total_sold
//! are never written here; only the sale transaction mutates them.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use caravel_core::Product;

/// Shared column list so every query maps the full Product row the same
/// way.
pub(crate) const PRODUCT_COLUMNS: &str = "\
    id, organization_id, name, description, brand, \
    category, sub_category, season, region, \
    warehouse_id, leadtime_days, supplier_reliability, transport_cost_cents, \
    supplier_name, supplier_contact, supplier_address, \
    selling_price_cents, cost_price_cents, tax_rate_bps, promotion_bps, \
    stock, total_sold, reorder_point, \
    weight, dimensions, image, expiry_date, is_active, is_featured, \
    created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, organization_id, name, description, brand,
                category, sub_category, season, region,
                warehouse_id, leadtime_days, supplier_reliability, transport_cost_cents,
                supplier_name, supplier_contact, supplier_address,
                selling_price_cents, cost_price_cents, tax_rate_bps, promotion_bps,
                stock, total_sold, reorder_point,
                weight, dimensions, image, expiry_date, is_active, is_featured,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12, ?13,
                ?14, ?15, ?16,
                ?17, ?18, ?19, ?20,
                ?21, ?22, ?23,
                ?24, ?25, ?26, ?27, ?28, ?29,
                ?30, ?31
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.organization_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.brand)
        .bind(product.category)
        .bind(&product.sub_category)
        .bind(product.season)
        .bind(product.region)
        .bind(product.warehouse_id)
        .bind(product.leadtime_days)
        .bind(product.supplier_reliability)
        .bind(product.transport_cost_cents)
        .bind(&product.supplier_name)
        .bind(&product.supplier_contact)
        .bind(&product.supplier_address)
        .bind(product.selling_price_cents)
        .bind(product.cost_price_cents)
        .bind(product.tax_rate_bps)
        .bind(product.promotion_bps)
        .bind(product.stock)
        .bind(product.total_sold)
        .bind(product.reorder_point)
        .bind(product.weight)
        .bind(&product.dimensions)
        .bind(&product.image)
        .bind(product.expiry_date)
        .bind(product.is_active)
        .bind(product.is_featured)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists an organization's products, newest first.
    pub async fn list_for_org(&self, organization_id: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE organization_id = ?1
            ORDER BY created_at DESC
            "#
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            organization_id = %organization_id,
            count = products.len(),
            "Listed products"
        );
        Ok(products)
    }

    /// Gets a product by ID, scoped to its owning organization.
    ///
    /// ## Returns
    /// * `Ok(None)` - product absent OR owned by another organization
    pub async fn get_for_org(
        &self,
        organization_id: &str,
        id: &str,
    ) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND organization_id = ?2"
        ))
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID regardless of owner.
    ///
    /// Used by the purchase-request flow, where the buyer needs the
    /// product's `organization_id` to address the seller.
    pub async fn get(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Returns the denormalized sales snapshot for an organization's
    /// catalog.
    ///
    /// Totals derived from these rows are a read-time approximation from
    /// `selling_price × total_sold`, not a reconciliation over sale rows.
    pub async fn sales_snapshot(&self, organization_id: &str) -> DbResult<Vec<ProductSalesRow>> {
        let rows = sqlx::query_as::<_, ProductSalesRow>(
            r#"
            SELECT id, name, selling_price_cents, cost_price_cents, total_sold
            FROM products
            WHERE organization_id = ?1
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// The per-product slice used for catalog-level sales totals.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductSalesRow {
    pub id: String,
    pub name: String,
    pub selling_price_cents: i64,
    pub cost_price_cents: i64,
    pub total_sold: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::{demo_org, demo_product};

    #[tokio::test]
    async fn test_insert_and_list_scoped() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let org_a = demo_org(&db, "a@example.com").await;
        let org_b = demo_org(&db, "b@example.com").await;

        let product = demo_product(&db, &org_a.id, 10_000, 6_000, 1_000, 10).await;
        demo_product(&db, &org_b.id, 5_000, 2_000, 0, 3).await;

        let listed = db.products().list_for_org(&org_a.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, product.id);

        // Scoped get hides other tenants' products
        assert!(db
            .products()
            .get_for_org(&org_b.id, &product.id)
            .await
            .unwrap()
            .is_none());

        // Unscoped get still finds them (purchase-request flow)
        let found = db.products().get(&product.id).await.unwrap().unwrap();
        assert_eq!(found.organization_id, org_a.id);
    }

    #[tokio::test]
    async fn test_sales_snapshot_shape() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let org = demo_org(&db, "snap@example.com").await;
        let product = demo_product(&db, &org.id, 10_000, 6_000, 1_000, 10).await;

        let rows = db.products().sales_snapshot(&org.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, product.id);
        assert_eq!(rows[0].total_sold, 0);
    }
}
