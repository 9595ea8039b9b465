//! # Catalog Repository
//!
//! Database operations for the service/product catalog.
//!
//! A salon catalog is small (hundreds of rows, not tens of thousands), so
//! search is a plain indexed LIKE rather than a full-text index.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use studio_core::{CatalogItem, ItemKind, Money};

/// All columns of `catalog_items`, in struct order.
const CATALOG_COLUMNS: &str = "id, kind, name, price_cents, is_active, created_at, updated_at";

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.catalog();
///
/// let corte = repo
///     .create(ItemKind::Service, "Corte Feminino", Money::from_cents(8000))
///     .await?;
/// let hits = repo.search("corte", 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Inserts a new catalog item.
    ///
    /// Callers validate the name and price first (see
    /// `studio_core::validation`); the repository persists what it is
    /// given.
    pub async fn create(
        &self,
        kind: ItemKind,
        name: &str,
        price: Money,
    ) -> DbResult<CatalogItem> {
        let now = Utc::now();
        let item = CatalogItem {
            id: Uuid::new_v4().to_string(),
            kind,
            name: name.trim().to_string(),
            price_cents: price.cents(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, name = %item.name, "Inserting catalog item");

        sqlx::query(
            r#"
            INSERT INTO catalog_items (id, kind, name, price_cents, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.id)
        .bind(item.kind)
        .bind(&item.name)
        .bind(item.price_cents)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    /// Gets a catalog item by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CatalogItem>> {
        let item = sqlx::query_as::<_, CatalogItem>(&format!(
            "SELECT {CATALOG_COLUMNS} FROM catalog_items WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Searches active items by name, case-insensitive substring match.
    ///
    /// An empty query lists active items alphabetically.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<CatalogItem>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching catalog");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let pattern = format!("%{query}%");
        let items = sqlx::query_as::<_, CatalogItem>(&format!(
            r#"
            SELECT {CATALOG_COLUMNS}
            FROM catalog_items
            WHERE is_active = 1 AND name LIKE ?1
            ORDER BY name
            LIMIT ?2
            "#
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists active items alphabetically.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<CatalogItem>> {
        let items = sqlx::query_as::<_, CatalogItem>(&format!(
            r#"
            SELECT {CATALOG_COLUMNS}
            FROM catalog_items
            WHERE is_active = 1
            ORDER BY name
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Counts all catalog items, active or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Updates an item's list price.
    ///
    /// Open comandas are unaffected: lines carry their own price
    /// snapshot.
    pub async fn update_price(&self, id: &str, price: Money) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE catalog_items SET price_cents = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(price.cents())
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Catalog item", id));
        }

        Ok(())
    }

    /// Deactivates an item (soft delete).
    ///
    /// History stays intact: comanda lines snapshot name and price.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE catalog_items SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Catalog item", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let repo = db.catalog();

        let created = repo
            .create(ItemKind::Service, "Corte Feminino", Money::from_cents(8000))
            .await
            .unwrap();

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Corte Feminino");
        assert_eq!(fetched.price_cents, 8000);
        assert_eq!(fetched.kind, ItemKind::Service);
        assert!(fetched.is_active);
    }

    #[tokio::test]
    async fn test_search_matches_substring() {
        let db = test_db().await;
        let repo = db.catalog();

        repo.create(ItemKind::Service, "Corte Feminino", Money::from_cents(8000))
            .await
            .unwrap();
        repo.create(ItemKind::Service, "Corte Masculino", Money::from_cents(5000))
            .await
            .unwrap();
        repo.create(ItemKind::Product, "Shampoo", Money::from_cents(3500))
            .await
            .unwrap();

        let hits = repo.search("corte", 20).await.unwrap();
        assert_eq!(hits.len(), 2);

        let all = repo.search("", 20).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_deactivated_items_leave_search() {
        let db = test_db().await;
        let repo = db.catalog();

        let item = repo
            .create(ItemKind::Product, "Shampoo", Money::from_cents(3500))
            .await
            .unwrap();
        repo.deactivate(&item.id).await.unwrap();

        assert!(repo.search("shampoo", 20).await.unwrap().is_empty());
        // Still fetchable by id for history.
        assert!(repo.get_by_id(&item.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_price() {
        let db = test_db().await;
        let repo = db.catalog();

        let item = repo
            .create(ItemKind::Service, "Escova", Money::from_cents(4500))
            .await
            .unwrap();
        repo.update_price(&item.id, Money::from_cents(5000))
            .await
            .unwrap();

        let fetched = repo.get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fetched.price_cents, 5000);
    }

    #[tokio::test]
    async fn test_update_missing_item_is_not_found() {
        let db = test_db().await;
        let err = db
            .catalog()
            .update_price("missing", Money::from_cents(100))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
