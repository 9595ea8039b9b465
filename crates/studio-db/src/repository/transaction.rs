//! # Transaction Repository
//!
//! Database operations for reconciled revenue records.
//!
//! ## Entry Pipeline
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │              Manual Entry (dashboard form)                        │
//! │                                                                   │
//! │  RawTransactionForm (strings)                                     │
//! │       │                                                           │
//! │       ▼                                                           │
//! │  sanitize() ──► validate() ──┬── invalid ──► EntryError::Invalid  │
//! │                              │              (complete error list) │
//! │                              ▼                                    │
//! │  Calculator::calculate() ──► check_integrity()                    │
//! │                              │                                    │
//! │                              ▼                                    │
//! │  INSERT transactions row (entry_date = form date or today)        │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Editing a row replays the same pipeline on the new tender amounts;
//! every derived column is recomputed, none is patched by hand.

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use studio_core::validation::{sanitize, validate, RawTransactionForm, ValidationReport};
use studio_core::{
    Calculator, CalculatorConfig, Clock, CoreError, Settlement, SplitRates, TenderBreakdown,
    Transaction,
};

/// All columns of `transactions`, in struct order.
const TRANSACTION_COLUMNS: &str = "id, entry_date, \
     cash_cents, pix_cents, debit_card_cents, credit_card_cents, \
     gross_total_cents, debit_fee_cents, credit_fee_cents, net_total_cents, \
     studio_share_cents, professional_share_cents, assistant_share_cents, \
     studio_rate_bps, professional_rate_bps, assistant_rate_bps, \
     comanda_id, created_at, updated_at";

// =============================================================================
// Entry Error
// =============================================================================

/// Failures while recording or editing a revenue entry.
#[derive(Debug, Error)]
pub enum EntryError {
    /// User-correctable input problems; contains EVERY violated rule so
    /// the form can display the complete list at once.
    #[error("Invalid entry: {0}")]
    Invalid(ValidationReport),

    /// Recomputed values disagree with what was about to be persisted.
    /// A defect, not user error: the write is blocked.
    #[error(transparent)]
    Integrity(CoreError),

    /// Storage failure, propagated without retry.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for EntryError {
    fn from(err: sqlx::Error) -> Self {
        EntryError::Db(DbError::from(err))
    }
}

// =============================================================================
// Period Summary
// =============================================================================

/// Aggregate revenue for a dashboard period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub transaction_count: i64,
    pub gross_total_cents: i64,
    pub debit_fee_cents: i64,
    pub credit_fee_cents: i64,
    pub net_total_cents: i64,
    pub studio_share_cents: i64,
    pub professional_share_cents: i64,
    pub assistant_share_cents: i64,
}

// =============================================================================
// Transaction Repository
// =============================================================================

/// Repository for revenue record operations.
///
/// Holds the calculator and the injected clock: every row it writes is
/// calculator output, stamped by the clock.
#[derive(Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    calculator: Calculator,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository with the default rates.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        TransactionRepository {
            pool,
            clock,
            calculator: Calculator::new(CalculatorConfig::default()),
        }
    }

    /// Replaces the rate configuration (alternate fee schedules in tests).
    pub fn with_config(mut self, config: CalculatorConfig) -> Self {
        self.calculator = Calculator::new(config);
        self
    }

    /// Records a manual revenue entry from a raw dashboard form.
    ///
    /// Sanitizes, validates (collecting every violated rule), calculates,
    /// integrity-checks, and inserts. A missing form date means "today"
    /// per the injected clock.
    pub async fn record_entry(&self, raw: &RawTransactionForm) -> Result<Transaction, EntryError> {
        let draft = sanitize(raw);

        let report = validate(&draft, self.clock.today());
        if !report.is_valid() {
            debug!(errors = report.errors.len(), "Entry rejected by validation");
            return Err(EntryError::Invalid(report));
        }

        let settlement = self.calculator.calculate(&draft.tender, draft.custom_split);
        self.calculator
            .check_integrity(&draft.tender, draft.custom_split, &settlement)
            .map_err(EntryError::Integrity)?;

        let entry_date = draft.entry_date.unwrap_or_else(|| self.clock.today());
        let tx_row = build_transaction(
            entry_date,
            &draft.tender,
            &settlement,
            None,
            self.clock.as_ref(),
        );

        insert_row(&self.pool, &tx_row).await?;

        debug!(id = %tx_row.id, date = %tx_row.entry_date, "Revenue entry recorded");

        Ok(tx_row)
    }

    /// Gets a transaction by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let tx = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tx)
    }

    /// Lists transactions with entry dates in `[from, to]`, newest first.
    pub async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Vec<Transaction>> {
        let txs = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE entry_date >= ?1 AND entry_date <= ?2
            ORDER BY entry_date DESC, created_at DESC
            "#
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(txs)
    }

    /// Recalculates a transaction from new tender amounts.
    ///
    /// Every derived column is replaced with fresh calculator output; the
    /// entry date and any comanda link are untouched.
    pub async fn update_tender(
        &self,
        id: &str,
        tender: TenderBreakdown,
        custom_split: Option<SplitRates>,
    ) -> Result<Transaction, EntryError> {
        let draft = studio_core::validation::TransactionDraft {
            tender,
            entry_date: None,
            custom_split,
        };
        let report = validate(&draft, self.clock.today());
        if !report.is_valid() {
            return Err(EntryError::Invalid(report));
        }

        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", id))?;

        let settlement = self.calculator.calculate(&tender, custom_split);
        self.calculator
            .check_integrity(&tender, custom_split, &settlement)
            .map_err(EntryError::Integrity)?;

        let now = self.clock.now();
        let split = settlement.applied_split;

        sqlx::query(
            r#"
            UPDATE transactions SET
                cash_cents = ?2,
                pix_cents = ?3,
                debit_card_cents = ?4,
                credit_card_cents = ?5,
                gross_total_cents = ?6,
                debit_fee_cents = ?7,
                credit_fee_cents = ?8,
                net_total_cents = ?9,
                studio_share_cents = ?10,
                professional_share_cents = ?11,
                assistant_share_cents = ?12,
                studio_rate_bps = ?13,
                professional_rate_bps = ?14,
                assistant_rate_bps = ?15,
                updated_at = ?16
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(tender.cash.cents())
        .bind(tender.pix.cents())
        .bind(tender.debit_card.cents())
        .bind(tender.credit_card.cents())
        .bind(settlement.gross_total.cents())
        .bind(settlement.debit_fee.cents())
        .bind(settlement.credit_fee.cents())
        .bind(settlement.net_total.cents())
        .bind(settlement.studio_share.cents())
        .bind(settlement.professional_share.cents())
        .bind(settlement.assistant_share.cents())
        .bind(split.studio.bps())
        .bind(split.professional.bps())
        .bind(split.assistant.bps())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Transaction {
            cash_cents: tender.cash.cents(),
            pix_cents: tender.pix.cents(),
            debit_card_cents: tender.debit_card.cents(),
            credit_card_cents: tender.credit_card.cents(),
            gross_total_cents: settlement.gross_total.cents(),
            debit_fee_cents: settlement.debit_fee.cents(),
            credit_fee_cents: settlement.credit_fee.cents(),
            net_total_cents: settlement.net_total.cents(),
            studio_share_cents: settlement.studio_share.cents(),
            professional_share_cents: settlement.professional_share.cents(),
            assistant_share_cents: settlement.assistant_share.cents(),
            studio_rate_bps: split.studio.bps(),
            professional_rate_bps: split.professional.bps(),
            assistant_rate_bps: split.assistant.bps(),
            updated_at: now,
            ..existing
        })
    }

    /// Deletes a transaction.
    ///
    /// Never cascades: a comanda that references this transaction keeps
    /// its closed status and its dangling reference.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", id));
        }

        Ok(())
    }

    /// Replays the calculation for a stored row and compares it field by
    /// field against the stored totals.
    ///
    /// ## Why This Exists
    /// Catches drift between the calculator and already-serialized data:
    /// a rate change shipped without a migration, a row edited by hand.
    /// A mismatch is logged and returned as a defect, never corrected in
    /// place.
    pub async fn verify_stored(&self, id: &str) -> Result<(), EntryError> {
        let tx = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", id))?;

        self.calculator
            .check_integrity(&tx.tender(), Some(tx.applied_split()), &tx.stored_settlement())
            .map_err(|err| {
                warn!(id = %id, %err, "Stored transaction failed integrity check");
                EntryError::Integrity(err)
            })
    }

    /// Aggregates revenue over `[from, to]` for the dashboard totals.
    pub async fn summary_between(&self, from: NaiveDate, to: NaiveDate) -> DbResult<PeriodSummary> {
        let summary = sqlx::query_as::<_, PeriodSummary>(
            r#"
            SELECT
                COUNT(*)                                  AS transaction_count,
                COALESCE(SUM(gross_total_cents), 0)       AS gross_total_cents,
                COALESCE(SUM(debit_fee_cents), 0)         AS debit_fee_cents,
                COALESCE(SUM(credit_fee_cents), 0)        AS credit_fee_cents,
                COALESCE(SUM(net_total_cents), 0)         AS net_total_cents,
                COALESCE(SUM(studio_share_cents), 0)      AS studio_share_cents,
                COALESCE(SUM(professional_share_cents), 0) AS professional_share_cents,
                COALESCE(SUM(assistant_share_cents), 0)   AS assistant_share_cents
            FROM transactions
            WHERE entry_date >= ?1 AND entry_date <= ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}

// =============================================================================
// Row Helpers (shared with the settlement service)
// =============================================================================

/// Builds a complete transaction row from calculator output.
pub(crate) fn build_transaction(
    entry_date: NaiveDate,
    tender: &TenderBreakdown,
    settlement: &Settlement,
    comanda_id: Option<String>,
    clock: &dyn Clock,
) -> Transaction {
    let now = clock.now();
    let split = settlement.applied_split;

    Transaction {
        id: Uuid::new_v4().to_string(),
        entry_date,
        cash_cents: tender.cash.cents(),
        pix_cents: tender.pix.cents(),
        debit_card_cents: tender.debit_card.cents(),
        credit_card_cents: tender.credit_card.cents(),
        gross_total_cents: settlement.gross_total.cents(),
        debit_fee_cents: settlement.debit_fee.cents(),
        credit_fee_cents: settlement.credit_fee.cents(),
        net_total_cents: settlement.net_total.cents(),
        studio_share_cents: settlement.studio_share.cents(),
        professional_share_cents: settlement.professional_share.cents(),
        assistant_share_cents: settlement.assistant_share.cents(),
        studio_rate_bps: split.studio.bps(),
        professional_rate_bps: split.professional.bps(),
        assistant_rate_bps: split.assistant.bps(),
        comanda_id,
        created_at: now,
        updated_at: now,
    }
}

/// Inserts a transaction row on any executor (pool or open transaction).
pub(crate) async fn insert_row<'c, E>(executor: E, tx: &Transaction) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO transactions (
            id, entry_date,
            cash_cents, pix_cents, debit_card_cents, credit_card_cents,
            gross_total_cents, debit_fee_cents, credit_fee_cents, net_total_cents,
            studio_share_cents, professional_share_cents, assistant_share_cents,
            studio_rate_bps, professional_rate_bps, assistant_rate_bps,
            comanda_id, created_at, updated_at
        ) VALUES (
            ?1, ?2,
            ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10,
            ?11, ?12, ?13,
            ?14, ?15, ?16,
            ?17, ?18, ?19
        )
        "#,
    )
    .bind(&tx.id)
    .bind(tx.entry_date)
    .bind(tx.cash_cents)
    .bind(tx.pix_cents)
    .bind(tx.debit_card_cents)
    .bind(tx.credit_card_cents)
    .bind(tx.gross_total_cents)
    .bind(tx.debit_fee_cents)
    .bind(tx.credit_fee_cents)
    .bind(tx.net_total_cents)
    .bind(tx.studio_share_cents)
    .bind(tx.professional_share_cents)
    .bind(tx.assistant_share_cents)
    .bind(tx.studio_rate_bps)
    .bind(tx.professional_rate_bps)
    .bind(tx.assistant_rate_bps)
    .bind(&tx.comanda_id)
    .bind(tx.created_at)
    .bind(tx.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use studio_core::validation::RawSplitForm;
    use studio_core::{FixedClock, Money};

    fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()))
    }

    async fn test_repo() -> (Database, TransactionRepository) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.transactions(fixed_clock());
        (db, repo)
    }

    fn credit_form(amount: &str) -> RawTransactionForm {
        RawTransactionForm {
            credit_card: Some(amount.to_string()),
            ..RawTransactionForm::default()
        }
    }

    #[tokio::test]
    async fn test_record_entry_derives_all_fields() {
        let (_db, repo) = test_repo().await;

        // R$1000,00 on credit card.
        let tx = repo.record_entry(&credit_form("1000,00")).await.unwrap();

        assert_eq!(tx.gross_total_cents, 100_000);
        assert_eq!(tx.credit_fee_cents, 3_510);
        assert_eq!(tx.net_total_cents, 96_490);
        assert_eq!(tx.studio_share_cents, 57_894);
        assert_eq!(tx.professional_share_cents, 38_596);
        assert_eq!(tx.assistant_share_cents, 9_649);
        assert_eq!(tx.studio_rate_bps, 6000);
        // Missing form date defaults to the clock's today.
        assert_eq!(tx.entry_date, NaiveDate::from_ymd_opt(2026, 2, 10).unwrap());

        let fetched = repo.get_by_id(&tx.id).await.unwrap().unwrap();
        assert_eq!(fetched.net_total_cents, 96_490);
    }

    #[tokio::test]
    async fn test_record_entry_with_custom_split() {
        let (_db, repo) = test_repo().await;

        let mut form = credit_form("1000,00");
        form.custom_split = Some(RawSplitForm {
            studio: Some("50".to_string()),
            professional: Some("30".to_string()),
            assistant: Some("20".to_string()),
        });

        let tx = repo.record_entry(&form).await.unwrap();
        assert_eq!(tx.studio_rate_bps, 5000);
        assert_eq!(tx.studio_share_cents, 48_245);
        assert_eq!(tx.assistant_share_cents, 19_298);
    }

    #[tokio::test]
    async fn test_invalid_entry_reports_everything_and_persists_nothing() {
        let (_db, repo) = test_repo().await;

        let form = RawTransactionForm {
            cash: Some("-5".to_string()),
            entry_date: Some("2099-01-01".to_string()),
            ..RawTransactionForm::default()
        };

        let err = repo.record_entry(&form).await.unwrap_err();
        match err {
            EntryError::Invalid(report) => {
                // Negative amount AND future date, reported together.
                assert_eq!(report.errors.len(), 2);
            }
            other => panic!("expected Invalid, got {other:?}"),
        }

        let today = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let all = repo
            .list_between(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(), today)
            .await
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_split_not_summing_to_100_is_rejected() {
        let (_db, repo) = test_repo().await;

        let mut form = credit_form("100,00");
        form.custom_split = Some(RawSplitForm {
            studio: Some("50".to_string()),
            professional: Some("30".to_string()),
            assistant: Some("19".to_string()),
        });

        assert!(matches!(
            repo.record_entry(&form).await.unwrap_err(),
            EntryError::Invalid(_)
        ));
    }

    #[tokio::test]
    async fn test_list_between_filters_by_date() {
        let (_db, repo) = test_repo().await;

        let mut early = credit_form("100,00");
        early.entry_date = Some("2026-02-01".to_string());
        repo.record_entry(&early).await.unwrap();

        let mut late = credit_form("200,00");
        late.entry_date = Some("2026-02-09".to_string());
        repo.record_entry(&late).await.unwrap();

        let feb_week = repo
            .list_between(
                NaiveDate::from_ymd_opt(2026, 2, 5).unwrap(),
                NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(feb_week.len(), 1);
        assert_eq!(feb_week[0].gross_total_cents, 20_000);
    }

    #[tokio::test]
    async fn test_update_tender_recalculates() {
        let (_db, repo) = test_repo().await;

        let tx = repo.record_entry(&credit_form("100,00")).await.unwrap();

        // Edit: it was actually paid in cash.
        let updated = repo
            .update_tender(
                &tx.id,
                TenderBreakdown {
                    cash: Money::from_cents(10_000),
                    ..TenderBreakdown::default()
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(updated.credit_card_cents, 0);
        assert_eq!(updated.credit_fee_cents, 0);
        assert_eq!(updated.net_total_cents, 10_000);
        assert_eq!(updated.entry_date, tx.entry_date);

        let fetched = repo.get_by_id(&tx.id).await.unwrap().unwrap();
        assert_eq!(fetched.net_total_cents, 10_000);
    }

    #[tokio::test]
    async fn test_delete() {
        let (_db, repo) = test_repo().await;

        let tx = repo.record_entry(&credit_form("100,00")).await.unwrap();
        repo.delete(&tx.id).await.unwrap();

        assert!(repo.get_by_id(&tx.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&tx.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_verify_stored_catches_tampering() {
        let (db, repo) = test_repo().await;

        let tx = repo.record_entry(&credit_form("1000,00")).await.unwrap();
        repo.verify_stored(&tx.id).await.unwrap();

        // Tamper with a derived column behind the calculator's back.
        sqlx::query("UPDATE transactions SET net_total_cents = 96000 WHERE id = ?1")
            .bind(&tx.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = repo.verify_stored(&tx.id).await.unwrap_err();
        match err {
            EntryError::Integrity(CoreError::IntegrityMismatch { field, .. }) => {
                assert_eq!(field, "net_total");
            }
            other => panic!("expected Integrity, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_alternate_fee_schedule() {
        use studio_core::{FeeSchedule, Rate};

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.transactions(fixed_clock()).with_config(CalculatorConfig {
            fees: FeeSchedule {
                debit: Rate::from_bps(100),
                credit: Rate::from_bps(200),
            },
            ..CalculatorConfig::default()
        });

        let tx = repo.record_entry(&credit_form("100,00")).await.unwrap();
        assert_eq!(tx.credit_fee_cents, 200);
        assert_eq!(tx.net_total_cents, 9_800);
    }

    #[tokio::test]
    async fn test_summary_between() {
        let (_db, repo) = test_repo().await;

        repo.record_entry(&credit_form("1000,00")).await.unwrap();
        let cash_form = RawTransactionForm {
            cash: Some("500,00".to_string()),
            ..RawTransactionForm::default()
        };
        repo.record_entry(&cash_form).await.unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let summary = repo.summary_between(today, today).await.unwrap();

        assert_eq!(summary.transaction_count, 2);
        assert_eq!(summary.gross_total_cents, 150_000);
        assert_eq!(summary.credit_fee_cents, 3_510);
        assert_eq!(summary.net_total_cents, 146_490);
    }
}
