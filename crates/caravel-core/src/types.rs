//! # Domain Types
//!
//! Core domain types used throughout Caravel.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Organization   │   │    Product      │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  email (login)  │   │  organization_id│   │  product_id     │       │
//! │  │  password_hash  │   │  stock          │   │  quantity       │       │
//! │  │  address        │   │  selling_price  │   │  profit_cents   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ SalesAggregate  │   │  Notification   │   │    TaxRate      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  (product,      │   │  from_org_id    │   │  bps (u32)      │       │
//! │  │   period type,  │   │  to_org_id      │   │  1000 = 10%     │       │
//! │  │   period start) │   │  PENDING →      │   └─────────────────┘       │
//! │  │  unique triple  │   │     PROCESSED   │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenancy
//! Every Product, Sale, SalesAggregate and Notification row carries the
//! owning organization id; reads must always filter on it. An organization
//! is both a seller (owns products) and a potential buyer (requests
//! purchases from other organizations).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::period::PeriodType;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000, so 1000 bps = 10%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Classification Enums
// =============================================================================

/// Top-level product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Electronics,
    Grocery,
    Beverages,
    RawMaterials,
    Pharmaceuticals,
}

/// Sales season the product targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
    AllYear,
}

/// Distribution region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Region {
    North,
    South,
    East,
    West,
    Central,
}

// =============================================================================
// Organization
// =============================================================================

/// A tenant account. Created at signup, read at login and session
/// resolution, essentially immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Organization {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name of the organization.
    pub name: String,

    /// Login identity; unique across all tenants.
    pub email: String,

    /// Argon2 password hash. Never serialized outward.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Optional postal address.
    pub address: Option<String>,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product owned by exactly one organization.
///
/// `stock` and `total_sold` are mutated only by the sale-recording
/// transaction; `stock` never goes negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning organization.
    pub organization_id: String,

    pub name: String,
    pub description: String,
    pub brand: Option<String>,

    // Classification
    pub category: ProductCategory,
    pub sub_category: String,
    pub season: Season,
    pub region: Region,

    // Supply chain
    pub warehouse_id: i64,
    pub leadtime_days: i64,
    /// Fraction in [0, 1] describing how dependable the supplier is.
    pub supplier_reliability: f64,
    pub transport_cost_cents: i64,
    pub supplier_name: Option<String>,
    pub supplier_contact: Option<String>,
    pub supplier_address: String,

    // Commerce
    /// Price in cents; authoritative at sale time.
    pub selling_price_cents: i64,
    /// Cost in cents, for profit calculations.
    pub cost_price_cents: i64,
    /// Tax rate in basis points (1000 = 10%).
    pub tax_rate_bps: u32,
    /// Active promotion discount in basis points.
    pub promotion_bps: u32,
    /// Units on hand. Never negative.
    pub stock: i64,
    /// Cumulative units sold over the product's lifetime.
    pub total_sold: i64,
    /// Stock level at which a re-order should be placed.
    pub reorder_point: i64,

    // Misc
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
    pub image: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_featured: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the selling price as Money.
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// Returns the cost price as Money.
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    /// Returns the tax rate.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Checks whether there is enough stock to sell `quantity` units.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Sale Figures
// =============================================================================

/// The monetary breakdown of one sale, derived from the product's current
/// pricing at the moment of sale.
///
/// ## Computation
/// ```text
/// unit_price   = product.selling_price              (snapshot)
/// total_amount = unit_price × quantity
/// tax_amount   = total_amount × tax_rate
/// profit       = (unit_price − cost_price) × quantity
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleFigures {
    pub unit_price: Money,
    pub total_amount: Money,
    pub tax_amount: Money,
    pub profit: Money,
}

impl SaleFigures {
    /// Computes the figures for selling `quantity` units of `product`.
    pub fn compute(product: &Product, quantity: i64) -> Self {
        let unit_price = product.selling_price();
        let total_amount = unit_price.multiply_quantity(quantity);
        let tax_amount = total_amount.calculate_tax(product.tax_rate());
        let profit = (unit_price - product.cost_price()).multiply_quantity(quantity);

        SaleFigures {
            unit_price,
            total_amount,
            tax_amount,
            profit,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// An immutable record of one completed transaction.
///
/// Created only by the sale-recording transaction; never updated or
/// deleted. Monetary fields are snapshots of the product pricing at sale
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub product_id: String,
    /// The organization this sale is attributed to.
    pub organization_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_amount_cents: i64,
    pub tax_amount_cents: i64,
    pub profit_cents: i64,
    pub sale_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sales Aggregate
// =============================================================================

/// A rolling bucket summarizing all sales of one product within a fixed
/// calendar period.
///
/// Keyed by the unique triple `(product_id, period_type, period_start)`.
/// The summed columns always equal the sum over the sales whose date falls
/// inside the bucket; `average_price_cents` is the derived
/// `total_revenue / total_quantity`, refreshed on every upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalesAggregate {
    pub id: String,
    pub product_id: String,
    pub organization_id: String,
    pub period_type: PeriodType,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub total_quantity: i64,
    pub total_revenue_cents: i64,
    pub total_profit_cents: i64,
    pub average_price_cents: i64,
    pub last_updated: DateTime<Utc>,
}

// =============================================================================
// Notification
// =============================================================================

/// Lifecycle of a cross-organization purchase request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationStatus {
    /// Awaiting a decision from the product owner.
    Pending,
    /// Approved; the underlying sale has been recorded.
    Processed,
}

impl Default for NotificationStatus {
    fn default() -> Self {
        NotificationStatus::Pending
    }
}

/// A cross-organization purchase request (not a transient UI toast).
///
/// Created PENDING by the buyer; transitions to PROCESSED exactly once,
/// when the seller approves and the sale is recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: String,
    /// Requesting (buyer) organization.
    pub from_org_id: String,
    /// Product owner (seller) organization.
    pub to_org_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Whether the request is still awaiting a decision.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == NotificationStatus::Pending
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(price_cents: i64, cost_cents: i64, tax_bps: u32, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "prod-1".to_string(),
            organization_id: "org-1".to_string(),
            name: "Wireless Headphones".to_string(),
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
            supplier_name: Some("TechSuppliers Inc".to_string()),
            supplier_contact: Some("+1-555-123-4567".to_string()),
            supplier_address: "123 Supplier St".to_string(),
            selling_price_cents: price_cents,
            cost_price_cents: cost_cents,
            tax_rate_bps: tax_bps,
            promotion_bps: 0,
            stock,
            total_sold: 0,
            reorder_point: 20,
            weight: Some(250.0),
            dimensions: Some("20x15x5".to_string()),
            image: None,
            expiry_date: None,
            is_active: true,
            is_featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1_000);
        assert_eq!(rate.bps(), 1_000);
        assert!((rate.percentage() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(8.25);
        assert_eq!(rate.bps(), 825);
    }

    #[test]
    fn test_sale_figures_worked_example() {
        // Price $100.00, cost $60.00, tax 10%, quantity 3.
        let product = test_product(10_000, 6_000, 1_000, 10);
        let figures = SaleFigures::compute(&product, 3);

        assert_eq!(figures.unit_price.cents(), 10_000);
        assert_eq!(figures.total_amount.cents(), 30_000);
        assert_eq!(figures.tax_amount.cents(), 3_000);
        assert_eq!(figures.profit.cents(), 12_000);
    }

    #[test]
    fn test_sale_figures_negative_margin() {
        // Selling below cost: profit goes negative, nothing clamps it.
        let product = test_product(5_000, 6_000, 0, 10);
        let figures = SaleFigures::compute(&product, 2);
        assert_eq!(figures.profit.cents(), -2_000);
    }

    #[test]
    fn test_has_stock_for() {
        let product = test_product(10_000, 6_000, 1_000, 7);
        assert!(product.has_stock_for(7));
        assert!(!product.has_stock_for(8));
    }

    #[test]
    fn test_notification_default_status() {
        assert_eq!(NotificationStatus::default(), NotificationStatus::Pending);
    }
}
