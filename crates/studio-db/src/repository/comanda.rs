//! # Comanda Repository
//!
//! Database operations for comandas and their line items.
//!
//! ## Comanda Lifecycle
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     Comanda Lifecycle                             │
//! │                                                                   │
//! │  1. OPEN                                                          │
//! │     └── open() → Comanda { status: Open, number: MAX+1 }          │
//! │                                                                   │
//! │  2. BUILD THE TAB                                                 │
//! │     └── add_item() → snapshot line, totals recomputed             │
//! │     └── update_item_quantity() / remove_item()                    │
//! │     └── set_discount()                                            │
//! │                                                                   │
//! │  3. SETTLE (see settlement::SettlementService)                    │
//! │     └── status → Closed, tender recorded, transaction linked      │
//! │                                                                   │
//! │  3'. OR CANCEL                                                    │
//! │     └── cancel() → status: Cancelled                              │
//! │                                                                   │
//! │  Closed/cancelled comandas are immutable: every mutation here     │
//! │  carries `AND status = 'open'` in its WHERE clause.               │
//! └───────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use studio_core::comanda::DraftLine;
use studio_core::{CatalogItem, Comanda, ComandaItem, ComandaStatus, Money};

/// All columns of `comandas`, in struct order. Shared with the
/// settlement service, which loads comandas inside its own transaction.
pub(crate) const COMANDA_COLUMNS: &str = "id, number, status, client_name, professional_name, \
     discount_cents, gross_items_cents, net_total_cents, \
     cash_cents, pix_cents, debit_card_cents, credit_card_cents, \
     transaction_id, created_at, updated_at, closed_at";

/// All columns of `comanda_items`, in struct order.
const ITEM_COLUMNS: &str = "id, comanda_id, kind, catalog_item_id, name_snapshot, \
     unit_price_cents, quantity, line_total_cents, created_at";

/// Repository for comanda database operations.
#[derive(Debug, Clone)]
pub struct ComandaRepository {
    pool: SqlitePool,
}

impl ComandaRepository {
    /// Creates a new ComandaRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ComandaRepository { pool }
    }

    /// Opens a new empty comanda with the next sequential display number.
    pub async fn open(
        &self,
        client_name: Option<&str>,
        professional_name: Option<&str>,
    ) -> DbResult<Comanda> {
        let mut tx = self.pool.begin().await?;

        // Next sequential display number, computed inside the insert
        // transaction.
        let number: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(number), 0) + 1 FROM comandas")
                .fetch_one(&mut *tx)
                .await?;

        let now = Utc::now();
        let comanda = Comanda {
            id: Uuid::new_v4().to_string(),
            number,
            status: ComandaStatus::Open,
            client_name: client_name.map(str::to_string),
            professional_name: professional_name.map(str::to_string),
            discount_cents: 0,
            gross_items_cents: 0,
            net_total_cents: 0,
            cash_cents: 0,
            pix_cents: 0,
            debit_card_cents: 0,
            credit_card_cents: 0,
            transaction_id: None,
            created_at: now,
            updated_at: now,
            closed_at: None,
        };

        debug!(id = %comanda.id, number = comanda.number, "Opening comanda");

        sqlx::query(
            r#"
            INSERT INTO comandas (
                id, number, status, client_name, professional_name,
                discount_cents, gross_items_cents, net_total_cents,
                cash_cents, pix_cents, debit_card_cents, credit_card_cents,
                transaction_id, created_at, updated_at, closed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )
        .bind(&comanda.id)
        .bind(comanda.number)
        .bind(comanda.status)
        .bind(&comanda.client_name)
        .bind(&comanda.professional_name)
        .bind(comanda.discount_cents)
        .bind(comanda.gross_items_cents)
        .bind(comanda.net_total_cents)
        .bind(comanda.cash_cents)
        .bind(comanda.pix_cents)
        .bind(comanda.debit_card_cents)
        .bind(comanda.credit_card_cents)
        .bind(&comanda.transaction_id)
        .bind(comanda.created_at)
        .bind(comanda.updated_at)
        .bind(comanda.closed_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(comanda)
    }

    /// Gets a comanda by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Comanda>> {
        let comanda = sqlx::query_as::<_, Comanda>(&format!(
            "SELECT {COMANDA_COLUMNS} FROM comandas WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comanda)
    }

    /// Gets all line items for a comanda, oldest first.
    pub async fn get_items(&self, comanda_id: &str) -> DbResult<Vec<ComandaItem>> {
        let items = sqlx::query_as::<_, ComandaItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM comanda_items
            WHERE comanda_id = ?1
            ORDER BY created_at, id
            "#
        ))
        .bind(comanda_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists open comandas, oldest first.
    pub async fn list_open(&self) -> DbResult<Vec<Comanda>> {
        let comandas = sqlx::query_as::<_, Comanda>(&format!(
            r#"
            SELECT {COMANDA_COLUMNS}
            FROM comandas
            WHERE status = 'open'
            ORDER BY number
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(comandas)
    }

    /// Adds a line item to an open comanda.
    ///
    /// ## Snapshot Pattern
    /// Name and price are copied from the catalog item (or the override)
    /// into the line, freezing what this tab charges regardless of later
    /// catalog edits.
    pub async fn add_item(
        &self,
        comanda_id: &str,
        catalog_item: &CatalogItem,
        quantity: i64,
        price_override: Option<Money>,
    ) -> DbResult<ComandaItem> {
        let line = DraftLine::from_catalog(catalog_item, quantity, price_override);
        let now = Utc::now();

        let line_total_cents = line.line_total().cents();
        let item = ComandaItem {
            id: Uuid::new_v4().to_string(),
            comanda_id: comanda_id.to_string(),
            kind: line.kind,
            catalog_item_id: line.catalog_item_id,
            name_snapshot: line.name,
            unit_price_cents: line.unit_price.cents(),
            quantity: line.quantity,
            line_total_cents,
            created_at: now,
        };

        debug!(comanda_id = %comanda_id, item = %item.name_snapshot, "Adding comanda item");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO comanda_items (
                id, comanda_id, kind, catalog_item_id, name_snapshot,
                unit_price_cents, quantity, line_total_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&item.id)
        .bind(&item.comanda_id)
        .bind(item.kind)
        .bind(&item.catalog_item_id)
        .bind(&item.name_snapshot)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .bind(item.line_total_cents)
        .bind(item.created_at)
        .execute(&mut *tx)
        .await?;

        Self::recompute_totals(&mut tx, comanda_id).await?;

        tx.commit().await?;

        Ok(item)
    }

    /// Sets the quantity of a line item; zero removes the line.
    pub async fn update_item_quantity(
        &self,
        comanda_id: &str,
        item_id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        if quantity == 0 {
            return self.remove_item(comanda_id, item_id).await;
        }

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE comanda_items SET
                quantity = ?3,
                line_total_cents = unit_price_cents * ?3
            WHERE id = ?2 AND comanda_id = ?1
            "#,
        )
        .bind(comanda_id)
        .bind(item_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Comanda item", item_id));
        }

        Self::recompute_totals(&mut tx, comanda_id).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Removes a line item from an open comanda.
    pub async fn remove_item(&self, comanda_id: &str, item_id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM comanda_items WHERE id = ?2 AND comanda_id = ?1")
            .bind(comanda_id)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Comanda item", item_id));
        }

        Self::recompute_totals(&mut tx, comanda_id).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Applies a flat discount to an open comanda.
    pub async fn set_discount(&self, comanda_id: &str, discount: Money) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE comandas SET
                discount_cents = ?2,
                net_total_cents = gross_items_cents - ?2,
                updated_at = ?3
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(comanda_id)
        .bind(discount.cents())
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Comanda (open)", comanda_id));
        }

        Ok(())
    }

    /// Cancels an open comanda.
    ///
    /// Line items stay on record; the comanda simply never settles.
    pub async fn cancel(&self, comanda_id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE comandas SET
                status = 'cancelled',
                updated_at = ?2
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(comanda_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Comanda (open)", comanda_id));
        }

        Ok(())
    }

    /// Recomputes a comanda's stored totals from its items, inside the
    /// caller's transaction.
    ///
    /// The `status = 'open'` guard makes this the chokepoint for
    /// closed-comanda immutability: any item write that slipped in above
    /// is rolled back when the guard fails.
    async fn recompute_totals(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        comanda_id: &str,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE comandas SET
                gross_items_cents = (
                    SELECT COALESCE(SUM(line_total_cents), 0)
                    FROM comanda_items WHERE comanda_id = ?1
                ),
                net_total_cents = (
                    SELECT COALESCE(SUM(line_total_cents), 0)
                    FROM comanda_items WHERE comanda_id = ?1
                ) - discount_cents,
                updated_at = ?2
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(comanda_id)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Comanda (open)", comanda_id));
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
    use studio_core::ItemKind;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn corte(db: &Database) -> CatalogItem {
        db.catalog()
            .create(ItemKind::Service, "Corte Feminino", Money::from_cents(8000))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_open_assigns_sequential_numbers() {
        let db = test_db().await;
        let repo = db.comandas();

        let first = repo.open(Some("Ana"), None).await.unwrap();
        let second = repo.open(None, Some("Bia")).await.unwrap();

        assert_eq!(first.number, 1);
        assert_eq!(second.number, 2);
        assert_eq!(first.status, ComandaStatus::Open);
        assert_eq!(second.client_name, None);
        assert_eq!(second.professional_name.as_deref(), Some("Bia"));
    }

    #[tokio::test]
    async fn test_add_item_recomputes_totals() {
        let db = test_db().await;
        let repo = db.comandas();
        let item = corte(&db).await;

        let comanda = repo.open(None, None).await.unwrap();
        repo.add_item(&comanda.id, &item, 2, None).await.unwrap();

        let stored = repo.get_by_id(&comanda.id).await.unwrap().unwrap();
        assert_eq!(stored.gross_items_cents, 16_000);
        assert_eq!(stored.net_total_cents, 16_000);

        let items = repo.get_items(&comanda.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name_snapshot, "Corte Feminino");
        assert_eq!(items[0].line_total_cents, 16_000);
    }

    #[tokio::test]
    async fn test_price_override_freezes_line_price() {
        let db = test_db().await;
        let repo = db.comandas();
        let item = corte(&db).await;

        let comanda = repo.open(None, None).await.unwrap();
        repo.add_item(&comanda.id, &item, 1, Some(Money::from_cents(7000)))
            .await
            .unwrap();

        // Catalog re-price after the fact.
        db.catalog()
            .update_price(&item.id, Money::from_cents(9999))
            .await
            .unwrap();

        let items = repo.get_items(&comanda.id).await.unwrap();
        assert_eq!(items[0].unit_price_cents, 7000);
    }

    #[tokio::test]
    async fn test_discount_and_negative_net() {
        let db = test_db().await;
        let repo = db.comandas();
        let item = corte(&db).await;

        let comanda = repo.open(None, None).await.unwrap();
        repo.add_item(&comanda.id, &item, 1, None).await.unwrap();

        repo.set_discount(&comanda.id, Money::from_cents(2000))
            .await
            .unwrap();
        let stored = repo.get_by_id(&comanda.id).await.unwrap().unwrap();
        assert_eq!(stored.net_total_cents, 6000);

        // A discount larger than the items drives net negative; accepted.
        repo.set_discount(&comanda.id, Money::from_cents(10_000))
            .await
            .unwrap();
        let stored = repo.get_by_id(&comanda.id).await.unwrap().unwrap();
        assert_eq!(stored.net_total_cents, -2000);
    }

    #[tokio::test]
    async fn test_update_and_remove_item() {
        let db = test_db().await;
        let repo = db.comandas();
        let item = corte(&db).await;

        let comanda = repo.open(None, None).await.unwrap();
        let line = repo.add_item(&comanda.id, &item, 1, None).await.unwrap();

        repo.update_item_quantity(&comanda.id, &line.id, 3)
            .await
            .unwrap();
        let stored = repo.get_by_id(&comanda.id).await.unwrap().unwrap();
        assert_eq!(stored.gross_items_cents, 24_000);

        // Quantity zero removes the line.
        repo.update_item_quantity(&comanda.id, &line.id, 0)
            .await
            .unwrap();
        assert!(repo.get_items(&comanda.id).await.unwrap().is_empty());

        let stored = repo.get_by_id(&comanda.id).await.unwrap().unwrap();
        assert_eq!(stored.gross_items_cents, 0);
    }

    #[tokio::test]
    async fn test_cancelled_comanda_is_immutable() {
        let db = test_db().await;
        let repo = db.comandas();
        let item = corte(&db).await;

        let comanda = repo.open(None, None).await.unwrap();
        repo.add_item(&comanda.id, &item, 1, None).await.unwrap();
        repo.cancel(&comanda.id).await.unwrap();

        // Mutations bounce off the status guard, stored fields untouched.
        assert!(repo.add_item(&comanda.id, &item, 1, None).await.is_err());
        assert!(repo
            .set_discount(&comanda.id, Money::from_cents(100))
            .await
            .is_err());
        assert!(repo.cancel(&comanda.id).await.is_err());

        let stored = repo.get_by_id(&comanda.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ComandaStatus::Cancelled);
        assert_eq!(stored.gross_items_cents, 8000);
        assert_eq!(stored.discount_cents, 0);
        assert_eq!(repo.get_items(&comanda.id).await.unwrap().len(), 1);
    }
}
