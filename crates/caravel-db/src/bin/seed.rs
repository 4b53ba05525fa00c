//! # Seed Data Generator
//!
//! Populates the database with a demo organization, a small catalog and a
//! few weeks of sales history for development.
//!
//! ## Usage
//! ```bash
//! # Default database path (./caravel.db)
//! cargo run -p caravel-db --bin seed
//!
//! # Specify database path
//! cargo run -p caravel-db --bin seed -- --db ./data/caravel.db
//! ```
//!
//! Sales are recorded through the real sale transaction, so stock,
//! total_sold and all aggregate buckets end up mutually consistent — the
//! seeded database satisfies the same invariants as a live one.

use chrono::{Duration, Utc};
use std::env;
use uuid::Uuid;

use caravel_core::{Organization, Product, ProductCategory, Region, Season};
use caravel_db::{Database, DbConfig};

/// (name, description, category, sub_category, price_cents, cost_cents,
/// tax_bps, stock)
const CATALOG: &[(&str, &str, ProductCategory, &str, i64, i64, u32, i64)] = &[
    (
        "Wireless Headphones",
        "High-quality wireless headphones with noise cancellation",
        ProductCategory::Electronics,
        "Audio",
        19_999,
        12_000,
        1_000,
        140,
    ),
    (
        "Mechanical Keyboard",
        "Tenkeyless mechanical keyboard, brown switches",
        ProductCategory::Electronics,
        "Accessories",
        8_999,
        5_200,
        1_000,
        90,
    ),
    (
        "Cold Brew Coffee",
        "Slow-steeped cold brew concentrate, 1L",
        ProductCategory::Beverages,
        "Coffee",
        1_299,
        620,
        500,
        400,
    ),
    (
        "Sparkling Water 12-pack",
        "Unsweetened sparkling water, lime",
        ProductCategory::Beverages,
        "Water",
        699,
        310,
        500,
        600,
    ),
    (
        "Whole Grain Flour 5kg",
        "Stone-milled whole grain flour",
        ProductCategory::RawMaterials,
        "Grains",
        2_499,
        1_400,
        0,
        250,
    ),
    (
        "Vitamin C 500mg",
        "Vitamin C supplement, 120 tablets",
        ProductCategory::Pharmaceuticals,
        "Vitamins",
        1_599,
        700,
        0,
        320,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let db_path = parse_db_path();
    println!("Seeding database at {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let org = Organization {
        id: Uuid::new_v4().to_string(),
        name: "Demo Organization".to_string(),
        email: "demo@example.com".to_string(),
        // Seed accounts are data-only; real hashes are issued by the
        // signup action.
        password_hash: "<unusable>".to_string(),
        address: Some("123 Demo Street, Demo City".to_string()),
        created_at: Utc::now(),
    };
    db.organizations().insert(&org).await?;
    println!("Created organization: {} <{}>", org.name, org.email);

    let mut product_ids = Vec::new();
    for (idx, (name, description, category, sub_category, price, cost, tax, stock)) in
        CATALOG.iter().enumerate()
    {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            organization_id: org.id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            brand: None,
            category: *category,
            sub_category: sub_category.to_string(),
            season: Season::AllYear,
            region: Region::Central,
            warehouse_id: (idx % 3 + 1) as i64,
            leadtime_days: 5,
            supplier_reliability: 0.9,
            transport_cost_cents: 1_500,
            supplier_name: Some("Acme Supply Co".to_string()),
            supplier_contact: Some("+1-555-0100".to_string()),
            supplier_address: "1 Supplier Way".to_string(),
            selling_price_cents: *price,
            cost_price_cents: *cost,
            tax_rate_bps: *tax,
            promotion_bps: 0,
            stock: *stock,
            total_sold: 0,
            reorder_point: 20,
            weight: None,
            dimensions: None,
            image: None,
            expiry_date: None,
            is_active: true,
            is_featured: idx == 0,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await?;
        println!("Created product: {}", product.name);
        product_ids.push(product.id);
    }

    // Six weeks of history: every product sells a small, varying quantity
    // every few days. Going through record_sale keeps buckets honest.
    let mut sales = 0u32;
    for day in 0..42i64 {
        let sale_date = Utc::now() - Duration::days(41 - day);
        for (idx, product_id) in product_ids.iter().enumerate() {
            if (day + idx as i64) % 3 != 0 {
                continue;
            }
            let quantity = (day + idx as i64) % 4 + 1;
            db.sales()
                .record_sale(&org.id, product_id, quantity, sale_date)
                .await?;
            sales += 1;
        }
    }
    println!("Recorded {sales} historical sales");

    println!("Seeding completed successfully!");
    Ok(())
}

/// Reads `--db <path>` from the command line, defaulting to ./caravel.db.
fn parse_db_path() -> String {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| "./caravel.db".to_string())
}
