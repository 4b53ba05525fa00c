//! # Aggregate Bucket Upserts
//!
//! Delta application for the rolling `sales_aggregates` buckets.
//!
//! ## Additive Upsert
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Aggregate Update Strategy                            │
//! │                                                                         │
//! │  ❌ WRONG: Absolute update (clobbers concurrent writers)               │
//! │     UPDATE sales_aggregates SET total_quantity = 12 WHERE ...          │
//! │                                                                         │
//! │  ✅ CORRECT: Delta upsert                                              │
//! │     INSERT ... ON CONFLICT DO UPDATE SET                               │
//! │         total_quantity = total_quantity + excluded.total_quantity      │
//! │                                                                         │
//! │  Two sales landing in the same bucket both apply their deltas; the     │
//! │  summed columns stay equal to the sum over the sale rows regardless    │
//! │  of ordering. Only the derived average is recomputed from the new      │
//! │  totals.                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module is crate-internal: buckets are written exclusively from the
//! sale-recording transaction in [`crate::repository::sale`].

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::DbResult;
use caravel_core::period::{PeriodBounds, PeriodType};

/// Applies one sale's contribution to a single aggregate bucket.
///
/// Creates the bucket with the sale's values on first contact; afterwards
/// increments quantity/revenue/profit and refreshes `average_price_cents`
/// as `total_revenue / total_quantity` over the new totals.
///
/// Runs on the caller's connection so it joins the surrounding sale
/// transaction.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn apply_sale_delta(
    conn: &mut SqliteConnection,
    product_id: &str,
    organization_id: &str,
    period_type: PeriodType,
    bounds: PeriodBounds,
    quantity: i64,
    revenue_cents: i64,
    profit_cents: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales_aggregates (
            id, product_id, organization_id, period_type, period_start, period_end,
            total_quantity, total_revenue_cents, total_profit_cents,
            average_price_cents, last_updated
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT (product_id, period_type, period_start) DO UPDATE SET
            total_quantity = total_quantity + excluded.total_quantity,
            total_revenue_cents = total_revenue_cents + excluded.total_revenue_cents,
            total_profit_cents = total_profit_cents + excluded.total_profit_cents,
            average_price_cents = (total_revenue_cents + excluded.total_revenue_cents)
                / (total_quantity + excluded.total_quantity),
            last_updated = excluded.last_updated
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(product_id)
    .bind(organization_id)
    .bind(period_type)
    .bind(bounds.start)
    .bind(bounds.end)
    .bind(quantity)
    .bind(revenue_cents)
    .bind(profit_cents)
    // quantity >= 1 is validated before any sale reaches this point
    .bind(revenue_cents / quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
