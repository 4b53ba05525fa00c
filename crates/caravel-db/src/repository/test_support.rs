//! Shared fixtures for repository tests.

use chrono::Utc;
use uuid::Uuid;

use crate::pool::Database;
use caravel_core::{Organization, Product, ProductCategory, Region, Season};

/// Inserts and returns a demo organization.
pub(crate) async fn demo_org(db: &Database, email: &str) -> Organization {
    let org = Organization {
        id: Uuid::new_v4().to_string(),
        name: format!("Org <{email}>"),
        email: email.to_string(),
        password_hash: "argon2-hash-placeholder".to_string(),
        address: Some("123 Demo Street".to_string()),
        created_at: Utc::now(),
    };
    db.organizations().insert(&org).await.unwrap();
    org
}

/// Inserts and returns a demo product with the given pricing and stock.
pub(crate) async fn demo_product(
    db: &Database,
    organization_id: &str,
    selling_price_cents: i64,
    cost_price_cents: i64,
    tax_rate_bps: u32,
    stock: i64,
) -> Product {
    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        organization_id: organization_id.to_string(),
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
        selling_price_cents,
        cost_price_cents,
        tax_rate_bps,
        promotion_bps: 0,
        stock,
        total_sold: 0,
        reorder_point: 2,
        weight: Some(250.0),
        dimensions: Some("20x15x5".to_string()),
        image: None,
        expiry_date: None,
        is_active: true,
        is_featured: false,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.unwrap();
    product
}
