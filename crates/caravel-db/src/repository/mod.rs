//! # Repository Module
//!
//! Database repository implementations for Caravel.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Action                                                                │
//! │       │                                                                 │
//! │       │  db.sales().record_sale(&org, &product, 3, now)                │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── record_sale(...)        one transaction: stock + sale + buckets   │
//! │  ├── list_for_period(...)                                              │
//! │  └── monthly_revenue(...)                                              │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Tenancy predicates live in ONE place per entity                     │
//! │  • SQL is isolated from the action layer                               │
//! │  • Easy to test against an in-memory pool                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`organization::OrganizationRepository`] - Tenant accounts
//! - [`product::ProductRepository`] - Catalog CRUD and sales snapshots
//! - [`sale::SaleRepository`] - The atomic sale transaction and reporting
//! - [`notification::NotificationRepository`] - Purchase request workflow

pub mod aggregate;
pub mod notification;
pub mod organization;
pub mod product;
pub mod sale;

#[cfg(test)]
pub(crate) mod test_support;
