//! # Organization Repository
//!
//! Database operations for tenant accounts. Organizations are created at
//! signup and read at login and session resolution; nothing updates them in
//! the current scope.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use caravel_core::Organization;

const ORGANIZATION_COLUMNS: &str = "id, name, email, password_hash, address, created_at";

/// Repository for organization database operations.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    pool: SqlitePool,
}

impl OrganizationRepository {
    /// Creates a new OrganizationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrganizationRepository { pool }
    }

    /// Inserts a new organization.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - email is already registered
    pub async fn insert(&self, org: &Organization) -> DbResult<()> {
        debug!(id = %org.id, email = %org.email, "Inserting organization");

        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, email, password_hash, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&org.id)
        .bind(&org.name)
        .bind(&org.email)
        .bind(&org.password_hash)
        .bind(&org.address)
        .bind(org.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            // Rewrite the raw constraint name into the form field
            DbError::UniqueViolation { .. } => DbError::UniqueViolation {
                field: "email".to_string(),
                value: org.email.clone(),
            },
            other => other,
        })?;

        Ok(())
    }

    /// Gets an organization by its ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Organization>> {
        let org = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }

    /// Gets an organization by its login email.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<Organization>> {
        let org = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use uuid::Uuid;

    fn demo_org(email: &str) -> Organization {
        Organization {
            id: Uuid::new_v4().to_string(),
            name: "Demo Organization".to_string(),
            email: email.to_string(),
            password_hash: "argon2-hash-placeholder".to_string(),
            address: Some("123 Demo Street".to_string()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.organizations();

        let org = demo_org("demo@example.com");
        repo.insert(&org).await.unwrap();

        let by_id = repo.get(&org.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "demo@example.com");

        let by_email = repo.find_by_email("demo@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, org.id);

        assert!(repo.find_by_email("missing@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.organizations();

        repo.insert(&demo_org("dup@example.com")).await.unwrap();
        let err = repo.insert(&demo_org("dup@example.com")).await.unwrap_err();

        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "email");
                assert_eq!(value, "dup@example.com");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }
}
