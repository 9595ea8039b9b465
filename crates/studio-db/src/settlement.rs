//! # Settlement Service
//!
//! Closes a comanda: records how it was paid, creates the revenue
//! transaction, and marks the comanda closed - atomically.
//!
//! ## Settlement Flow
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │            settle(comanda_id, tender)                             │
//! │                                                                   │
//! │  BEGIN TRANSACTION                                                │
//! │    │                                                              │
//! │    ├── load comanda ──────────── missing? → NotFound              │
//! │    ├── status check ──────────── not open? → NotOpen              │
//! │    ├── |tender - net| ≤ R$0,01 ─ off? → TenderMismatch            │
//! │    │                             (caller re-prompts the operator) │
//! │    ├── calculate fees & shares, replay-check the result           │
//! │    ├── INSERT transactions row (dated today)                      │
//! │    └── UPDATE comandas: tender, closed, closed_at, link           │
//! │        (guarded by status = 'open')                               │
//! │  COMMIT                                                           │
//! │                                                                   │
//! │  Any failure rolls back BOTH writes: there is no state where the  │
//! │  revenue row exists but the comanda is still open, or vice versa. │
//! └───────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::DbError;
use crate::repository::comanda::COMANDA_COLUMNS;
use crate::repository::transaction::{build_transaction, insert_row};
use studio_core::{
    Calculator, CalculatorConfig, Clock, Comanda, ComandaStatus, CoreError, TenderBreakdown,
    Transaction, SETTLEMENT_TOLERANCE_CENTS,
};

// =============================================================================
// Settlement Error
// =============================================================================

/// Failures while settling a comanda.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// No comanda with that ID.
    #[error("Comanda not found: {0}")]
    NotFound(String),

    /// Comanda already closed or cancelled.
    #[error("Comanda {id} is {status}, cannot settle")]
    NotOpen { id: String, status: String },

    /// Tendered methods don't add up to the comanda's net total. The
    /// operator mistyped an amount; the caller re-prompts.
    #[error(
        "Tendered total ({tendered_cents} centavos) does not match comanda net total ({expected_cents} centavos)"
    )]
    TenderMismatch {
        expected_cents: i64,
        tendered_cents: i64,
    },

    /// The replayed calculation disagrees with the values about to be
    /// persisted - a defect, never user error.
    #[error(transparent)]
    Integrity(CoreError),

    /// Storage failure; both writes were rolled back.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl SettlementError {
    /// Whether the operator can fix this by correcting their input.
    ///
    /// `true` → re-prompt; `false` → surface and investigate.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            SettlementError::NotOpen { .. } | SettlementError::TenderMismatch { .. }
        )
    }
}

impl From<sqlx::Error> for SettlementError {
    fn from(err: sqlx::Error) -> Self {
        SettlementError::Db(DbError::from(err))
    }
}

// =============================================================================
// Settled Comanda
// =============================================================================

/// The result of a successful settlement: the closed comanda and the
/// transaction it produced, exactly as persisted.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettledComanda {
    pub comanda: Comanda,
    pub transaction: Transaction,
}

// =============================================================================
// Settlement Service
// =============================================================================

/// Orchestrates the comanda-closing transaction.
#[derive(Clone)]
pub struct SettlementService {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    calculator: Calculator,
}

impl SettlementService {
    /// Creates a settlement service with the default rates.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        SettlementService {
            pool,
            clock,
            calculator: Calculator::new(CalculatorConfig::default()),
        }
    }

    /// Replaces the rate configuration.
    pub fn with_config(mut self, config: CalculatorConfig) -> Self {
        self.calculator = Calculator::new(config);
        self
    }

    /// Settles an open comanda with the given tender breakdown.
    ///
    /// ## Preconditions
    /// - The comanda exists and is open
    /// - `tender.total()` matches the comanda's net total within one
    ///   centavo
    ///
    /// ## Effects (atomic: both or neither)
    /// - One `transactions` row, dated today, linked to the comanda,
    ///   with no custom split - settlements always use the default rates
    /// - The comanda: tender recorded, `status = closed`, `closed_at`
    ///   stamped, `transaction_id` set
    pub async fn settle(
        &self,
        comanda_id: &str,
        tender: TenderBreakdown,
    ) -> Result<SettledComanda, SettlementError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let comanda: Comanda = sqlx::query_as(&format!(
            "SELECT {COMANDA_COLUMNS} FROM comandas WHERE id = ?1"
        ))
        .bind(comanda_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| SettlementError::NotFound(comanda_id.to_string()))?;

        if !comanda.is_open() {
            return Err(SettlementError::NotOpen {
                id: comanda.id,
                status: comanda.status.as_str().to_string(),
            });
        }

        let tendered = tender.total();
        let difference = (tendered - comanda.net_total()).cents().abs();
        if difference > SETTLEMENT_TOLERANCE_CENTS {
            return Err(SettlementError::TenderMismatch {
                expected_cents: comanda.net_total_cents,
                tendered_cents: tendered.cents(),
            });
        }

        // Settlements never carry a custom split.
        let settlement = self.calculator.calculate(&tender, None);
        self.calculator
            .check_integrity(&tender, None, &settlement)
            .map_err(|err| {
                warn!(comanda_id = %comanda_id, %err, "Settlement blocked by integrity check");
                SettlementError::Integrity(err)
            })?;

        let transaction = build_transaction(
            self.clock.today(),
            &tender,
            &settlement,
            Some(comanda.id.clone()),
            self.clock.as_ref(),
        );

        insert_row(&mut *tx, &transaction).await?;

        let closed_at = self.clock.now();
        let result = sqlx::query(
            r#"
            UPDATE comandas SET
                cash_cents = ?2,
                pix_cents = ?3,
                debit_card_cents = ?4,
                credit_card_cents = ?5,
                status = 'closed',
                transaction_id = ?6,
                closed_at = ?7,
                updated_at = ?7
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(&comanda.id)
        .bind(tender.cash.cents())
        .bind(tender.pix.cents())
        .bind(tender.debit_card.cents())
        .bind(tender.credit_card.cents())
        .bind(&transaction.id)
        .bind(closed_at)
        .execute(&mut *tx)
        .await?;

        // A concurrent settle may have closed it between our read and
        // this guarded write; rolling back keeps the transaction row out.
        if result.rows_affected() == 0 {
            return Err(SettlementError::NotOpen {
                id: comanda.id,
                status: ComandaStatus::Closed.as_str().to_string(),
            });
        }

        tx.commit().await?;

        info!(
            comanda = comanda.number,
            transaction = %transaction.id,
            gross = %settlement.gross_total,
            "Comanda settled"
        );

        Ok(SettledComanda {
            comanda: Comanda {
                cash_cents: tender.cash.cents(),
                pix_cents: tender.pix.cents(),
                debit_card_cents: tender.debit_card.cents(),
                credit_card_cents: tender.credit_card.cents(),
                status: ComandaStatus::Closed,
                transaction_id: Some(transaction.id.clone()),
                closed_at: Some(closed_at),
                updated_at: closed_at,
                ..comanda
            },
            transaction,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
