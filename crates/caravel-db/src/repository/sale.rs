//! # Sale Repository
//!
//! The atomic sale-recording transaction and the sales reporting reads.
//!
//! ## The Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   record_sale (ONE transaction)                         │
//! │                                                                         │
//! │  1. LOAD PRODUCT (scoped to the selling organization)                  │
//! │     └── absent → NotFound, nothing written                             │
//! │                                                                         │
//! │  2. GUARDED STOCK DECREMENT                                            │
//! │     └── UPDATE products SET stock = stock - q, total_sold = ... + q    │
//! │         WHERE id = ? AND stock >= q                                    │
//! │     └── zero rows → InsufficientStock, transaction rolls back          │
//! │                                                                         │
//! │  3. INSERT SALE (immutable snapshot of price/tax/profit)               │
//! │                                                                         │
//! │  4. UPSERT THREE BUCKETS (day, week, month containing sale_date)       │
//! │     └── additive deltas, derived average refreshed                     │
//! │                                                                         │
//! │  COMMIT ← all four writes succeed or none is observable                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guard in step 2 is what makes concurrent sales safe: two requests
//! whose combined quantity exceeds stock cannot both pass, because the
//! check-and-decrement is a single statement inside the transaction.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::aggregate;
use crate::repository::product::PRODUCT_COLUMNS;
use caravel_core::period::PeriodType;
use caravel_core::{Product, Sale, SaleFigures, SalesAggregate};

const SALE_COLUMNS: &str = "\
    id, product_id, organization_id, quantity, unit_price_cents, \
    total_amount_cents, tax_amount_cents, profit_cents, sale_date, created_at";

const AGGREGATE_COLUMNS: &str = "\
    id, product_id, organization_id, period_type, period_start, period_end, \
    total_quantity, total_revenue_cents, total_profit_cents, \
    average_price_cents, last_updated";

/// The result of a successfully recorded sale.
#[derive(Debug, Clone)]
pub struct SaleOutcome {
    /// The inserted, immutable sale row.
    pub sale: Sale,
    /// The product as it looks after the stock decrement.
    pub product: Product,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale of `quantity` units of one of the organization's own
    /// products, atomically.
    ///
    /// ## Arguments
    /// * `organization_id` - the selling organization; the product must
    ///   belong to it
    /// * `sale_date` - the instant the sale is dated at; also selects the
    ///   three aggregate buckets
    ///
    /// ## Errors
    /// * `DbError::NotFound` - product absent or owned by another tenant
    /// * `DbError::InsufficientStock` - fewer than `quantity` units on hand
    pub async fn record_sale(
        &self,
        organization_id: &str,
        product_id: &str,
        quantity: i64,
        sale_date: DateTime<Utc>,
    ) -> DbResult<SaleOutcome> {
        debug!(
            organization_id = %organization_id,
            product_id = %product_id,
            quantity = %quantity,
            "Recording sale"
        );

        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND organization_id = ?2"
        ))
        .bind(product_id)
        .bind(organization_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", product_id))?;

        let sale = record_sale_on(&mut tx, &product, organization_id, quantity, sale_date).await?;

        // Re-read so the caller sees the post-decrement stock
        let updated = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(sale_id = %sale.id, stock = updated.stock, "Sale recorded");

        Ok(SaleOutcome {
            sale,
            product: updated,
        })
    }

    /// Lists an organization's sales within `[start, end]`, newest first,
    /// joined with product and organization names.
    pub async fn list_for_period(
        &self,
        organization_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<SaleWithContext>> {
        let sales = sqlx::query_as::<_, SaleWithContext>(
            r#"
            SELECT
                s.id, s.product_id, s.organization_id, s.quantity,
                s.unit_price_cents, s.total_amount_cents, s.tax_amount_cents,
                s.profit_cents, s.sale_date, s.created_at,
                p.name AS product_name,
                p.selling_price_cents AS product_selling_price_cents,
                o.name AS organization_name
            FROM sales s
            INNER JOIN products p ON p.id = s.product_id
            INNER JOIN organizations o ON o.id = s.organization_id
            WHERE s.organization_id = ?1
              AND s.sale_date >= ?2
              AND s.sale_date <= ?3
            ORDER BY s.sale_date DESC
            "#,
        )
        .bind(organization_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Revenue per month-bucket start for one organization within
    /// `[year_start, year_end)`, from the MONTH aggregates, ascending.
    ///
    /// One organization can have many products and hence many MONTH rows
    /// per bucket start; they are summed here.
    pub async fn monthly_revenue(
        &self,
        organization_id: &str,
        year_start: DateTime<Utc>,
        year_end: DateTime<Utc>,
    ) -> DbResult<Vec<MonthlyRevenueRow>> {
        let rows = sqlx::query_as::<_, MonthlyRevenueRow>(
            r#"
            SELECT period_start, SUM(total_revenue_cents) AS revenue_cents
            FROM sales_aggregates
            WHERE organization_id = ?1
              AND period_type = ?2
              AND period_start >= ?3
              AND period_start < ?4
            GROUP BY period_start
            ORDER BY period_start ASC
            "#,
        )
        .bind(organization_id)
        .bind(PeriodType::Month)
        .bind(year_start)
        .bind(year_end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Fetches one aggregate bucket by its uniqueness triple.
    pub async fn bucket(
        &self,
        product_id: &str,
        period_type: PeriodType,
        period_start: DateTime<Utc>,
    ) -> DbResult<Option<SalesAggregate>> {
        let bucket = sqlx::query_as::<_, SalesAggregate>(&format!(
            r#"
            SELECT {AGGREGATE_COLUMNS}
            FROM sales_aggregates
            WHERE product_id = ?1 AND period_type = ?2 AND period_start = ?3
            "#
        ))
        .bind(product_id)
        .bind(period_type)
        .bind(period_start)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bucket)
    }

    /// Counts sale rows for a product. Diagnostics and tests.
    pub async fn count_for_product(&self, product_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE product_id = ?1")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Performs the write half of a sale on an existing transaction: guarded
/// stock decrement, sale insert and the three bucket upserts.
///
/// The caller owns the transaction and the product lookup policy (scoped
/// for direct sales, unscoped for approved purchase requests) and chooses
/// which organization the sale is attributed to.
pub(crate) async fn record_sale_on(
    conn: &mut SqliteConnection,
    product: &Product,
    attributed_org_id: &str,
    quantity: i64,
    sale_date: DateTime<Utc>,
) -> DbResult<Sale> {
    let figures = SaleFigures::compute(product, quantity);
    let now = Utc::now();

    // Check-and-decrement in one statement; the WHERE guard is the stock
    // invariant under concurrency.
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock - ?1,
            total_sold = total_sold + ?1,
            updated_at = ?2
        WHERE id = ?3 AND stock >= ?1
        "#,
    )
    .bind(quantity)
    .bind(now)
    .bind(&product.id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let available: i64 = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(&product.id)
            .fetch_optional(&mut *conn)
            .await?
            .unwrap_or(0);

        return Err(DbError::InsufficientStock {
            available,
            requested: quantity,
        });
    }

    let sale = Sale {
        id: Uuid::new_v4().to_string(),
        product_id: product.id.clone(),
        organization_id: attributed_org_id.to_string(),
        quantity,
        unit_price_cents: figures.unit_price.cents(),
        total_amount_cents: figures.total_amount.cents(),
        tax_amount_cents: figures.tax_amount.cents(),
        profit_cents: figures.profit.cents(),
        sale_date,
        created_at: now,
    };

    sqlx::query(&format!(
        r#"
        INSERT INTO sales ({SALE_COLUMNS})
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#
    ))
    .bind(&sale.id)
    .bind(&sale.product_id)
    .bind(&sale.organization_id)
    .bind(sale.quantity)
    .bind(sale.unit_price_cents)
    .bind(sale.total_amount_cents)
    .bind(sale.tax_amount_cents)
    .bind(sale.profit_cents)
    .bind(sale.sale_date)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    for period_type in PeriodType::ALL {
        let bounds = period_type.bounds(sale_date);
        aggregate::apply_sale_delta(
            conn,
            &product.id,
            attributed_org_id,
            period_type,
            bounds,
            quantity,
            figures.total_amount.cents(),
            figures.profit.cents(),
            now,
        )
        .await?;
    }

    Ok(sale)
}

// =============================================================================
// Row Types
// =============================================================================

/// A sale joined with its product and organization names, for the monthly
/// sales report.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct SaleWithContext {
    pub id: String,
    pub product_id: String,
    pub organization_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_amount_cents: i64,
    pub tax_amount_cents: i64,
    pub profit_cents: i64,
    pub sale_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub product_selling_price_cents: i64,
    pub organization_name: String,
}

/// One MONTH-bucket start with the organization's summed revenue.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthlyRevenueRow {
    pub period_start: DateTime<Utc>,
    pub revenue_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
