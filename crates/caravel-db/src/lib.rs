//! # caravel-db: Database Layer for Caravel
//!
//! This crate provides database access for the Caravel system.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caravel Data Flow                                │
//! │                                                                         │
//! │  Action (record_sale, approve_notification, ...)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     caravel-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (product.rs,  │    │  (embedded)  │  │   │
//! │  │   │               │    │  sale.rs, ...)│    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ guarded stock │    │ 001_initial_ │  │   │
//! │  │   │ WAL mode      │    │ decrement +   │    │ schema.sql   │  │   │
//! │  │   │               │    │ bucket upsert │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                       SQLite Database                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations per entity
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caravel_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/caravel.db")).await?;
//!
//! let outcome = db
//!     .sales()
//!     .record_sale(&org_id, &product_id, 3, Utc::now())
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::notification::NotificationRepository;
pub use repository::organization::OrganizationRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
