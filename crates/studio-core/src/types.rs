//! # Domain Types
//!
//! Core domain types used throughout Studio POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                              │
//! │                                                                   │
//! │  ┌───────────────┐   ┌────────────────┐   ┌────────────────┐     │
//! │  │  CatalogItem  │   │    Comanda     │   │  Transaction   │     │
//! │  │  ───────────  │   │  ────────────  │   │  ────────────  │     │
//! │  │  id (UUID)    │   │  id (UUID)     │   │  id (UUID)     │     │
//! │  │  kind         │   │  number (seq)  │   │  entry_date    │     │
//! │  │  name         │   │  status        │   │  tender ×4     │     │
//! │  │  price_cents  │   │  items, net    │   │  fees, shares  │     │
//! │  └───────┬───────┘   └───────┬────────┘   └────────────────┘     │
//! │          │ snapshot          │ settle ──────────►▲               │
//! │          ▼                   ▼                                   │
//! │  ┌───────────────────────────────────┐                           │
//! │  │           ComandaItem             │                           │
//! │  │  name/price frozen at add time    │                           │
//! │  └───────────────────────────────────┘                           │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A comanda item copies the catalog item's name and price when added.
//! Re-pricing a service later must never rewrite history on an old tab.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::calculator::{Settlement, TenderBreakdown};
use crate::money::Money;
use crate::rates::{Rate, SplitRates};

// =============================================================================
// Comanda Status
// =============================================================================

/// Lifecycle state of a comanda.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ComandaStatus {
    /// Accepting items and discounts; the only settleable state.
    Open,
    /// Settled: tender recorded, transaction created, immutable.
    Closed,
    /// Abandoned without payment; immutable.
    Cancelled,
}

impl ComandaStatus {
    /// Lowercase label matching the database representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ComandaStatus::Open => "open",
            ComandaStatus::Closed => "closed",
            ComandaStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for ComandaStatus {
    fn default() -> Self {
        ComandaStatus::Open
    }
}

// =============================================================================
// Item Kind
// =============================================================================

/// What a comanda line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A service performed (cut, color, blow-dry...).
    Service,
    /// A retail product sold over the counter.
    Product,
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A service or product offered by the studio.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CatalogItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Service or product.
    pub kind: ItemKind,

    /// Display name shown on the comanda and receipts.
    pub name: String,

    /// List price in centavos. Overridable per comanda line.
    pub price_cents: i64,

    /// Whether the item is offered (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    /// Returns the list price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Comanda
// =============================================================================

/// A running tab for one client visit.
///
/// Accumulates service/product lines while open; closed exactly once by
/// settlement, which records the tender breakdown and links the resulting
/// [`Transaction`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Comanda {
    pub id: String,

    /// Sequential display number ("Comanda nº 42").
    pub number: i64,

    pub status: ComandaStatus,

    /// Client receiving the services, when known.
    pub client_name: Option<String>,

    /// Primary professional attending the visit, when assigned.
    pub professional_name: Option<String>,

    /// Flat discount in centavos. May exceed the item total; net going
    /// negative is accepted rather than guarded.
    pub discount_cents: i64,

    /// Sum of line totals.
    pub gross_items_cents: i64,

    /// `gross_items - discount`.
    pub net_total_cents: i64,

    /// Tender breakdown, populated at close (zero while open).
    pub cash_cents: i64,
    pub pix_cents: i64,
    pub debit_card_cents: i64,
    pub credit_card_cents: i64,

    /// The transaction created by settlement, once closed.
    pub transaction_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Comanda {
    /// Whether the comanda still accepts mutations.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == ComandaStatus::Open
    }

    /// Returns the net total as Money.
    #[inline]
    pub fn net_total(&self) -> Money {
        Money::from_cents(self.net_total_cents)
    }

    /// Returns the discount as Money.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    /// Returns the recorded tender breakdown (all zero while open).
    pub fn tender(&self) -> TenderBreakdown {
        TenderBreakdown {
            cash: Money::from_cents(self.cash_cents),
            pix: Money::from_cents(self.pix_cents),
            debit_card: Money::from_cents(self.debit_card_cents),
            credit_card: Money::from_cents(self.credit_card_cents),
        }
    }
}

// =============================================================================
// Comanda Item
// =============================================================================

/// One line on a comanda.
///
/// Uses the snapshot pattern: name and unit price are frozen at add time,
/// so later catalog changes never alter an existing tab.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ComandaItem {
    pub id: String,
    pub comanda_id: String,
    pub kind: ItemKind,

    /// The catalog item this line was created from.
    pub catalog_item_id: String,

    /// Name at time of adding (frozen).
    pub name_snapshot: String,

    /// Unit price in centavos at time of adding, possibly overridden.
    pub unit_price_cents: i64,

    pub quantity: i64,

    /// `quantity × unit_price`.
    pub line_total_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl ComandaItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A reconciled revenue record: one manual dashboard entry or one settled
/// comanda.
///
/// The four tender columns are the raw inputs; everything else is derived
/// by the calculator and re-derivable from them plus the stored rates -
/// which is exactly what the integrity recheck does.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: String,

    /// Calendar day the revenue belongs to.
    #[ts(as = "String")]
    pub entry_date: NaiveDate,

    /// Raw tendered amounts.
    pub cash_cents: i64,
    pub pix_cents: i64,
    pub debit_card_cents: i64,
    pub credit_card_cents: i64,

    /// Derived totals.
    pub gross_total_cents: i64,
    pub debit_fee_cents: i64,
    pub credit_fee_cents: i64,
    pub net_total_cents: i64,

    /// Derived shares.
    pub studio_share_cents: i64,
    pub professional_share_cents: i64,
    pub assistant_share_cents: i64,

    /// Split rates applied, in basis points. Stored so the calculation
    /// can be replayed against this row later.
    pub studio_rate_bps: u32,
    pub professional_rate_bps: u32,
    pub assistant_rate_bps: u32,

    /// The comanda this transaction settled, if any. Deleting the
    /// transaction never cascades back.
    pub comanda_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Rebuilds the tender breakdown from the stored raw amounts.
    pub fn tender(&self) -> TenderBreakdown {
        TenderBreakdown {
            cash: Money::from_cents(self.cash_cents),
            pix: Money::from_cents(self.pix_cents),
            debit_card: Money::from_cents(self.debit_card_cents),
            credit_card: Money::from_cents(self.credit_card_cents),
        }
    }

    /// Rebuilds the split rates applied to this row.
    pub fn applied_split(&self) -> SplitRates {
        SplitRates {
            studio: Rate::from_bps(self.studio_rate_bps),
            professional: Rate::from_bps(self.professional_rate_bps),
            assistant: Rate::from_bps(self.assistant_rate_bps),
        }
    }

    /// Rebuilds the stored derived values as a [`Settlement`], for
    /// comparison against a fresh calculation.
    pub fn stored_settlement(&self) -> Settlement {
        Settlement {
            gross_total: Money::from_cents(self.gross_total_cents),
            debit_fee: Money::from_cents(self.debit_fee_cents),
            credit_fee: Money::from_cents(self.credit_fee_cents),
            net_total: Money::from_cents(self.net_total_cents),
            studio_share: Money::from_cents(self.studio_share_cents),
            professional_share: Money::from_cents(self.professional_share_cents),
            assistant_share: Money::from_cents(self.assistant_share_cents),
            applied_split: self.applied_split(),
        }
    }

    /// Returns the net total as Money.
    #[inline]
    pub fn net_total(&self) -> Money {
        Money::from_cents(self.net_total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(ComandaStatus::Open.as_str(), "open");
        assert_eq!(ComandaStatus::Closed.as_str(), "closed");
        assert_eq!(ComandaStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_status_default_is_open() {
        assert_eq!(ComandaStatus::default(), ComandaStatus::Open);
    }

    #[test]
    fn test_transaction_roundtrips_settlement() {
        let now = Utc::now();
        let tx = Transaction {
            id: "t1".to_string(),
            entry_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            cash_cents: 0,
            pix_cents: 0,
            debit_card_cents: 0,
            credit_card_cents: 100_000,
            gross_total_cents: 100_000,
            debit_fee_cents: 0,
            credit_fee_cents: 3_510,
            net_total_cents: 96_490,
            studio_share_cents: 57_894,
            professional_share_cents: 38_596,
            assistant_share_cents: 9_649,
            studio_rate_bps: 6000,
            professional_rate_bps: 4000,
            assistant_rate_bps: 1000,
            comanda_id: None,
            created_at: now,
            updated_at: now,
        };

        let settlement = tx.stored_settlement();
        assert_eq!(settlement.gross_total.cents(), 100_000);
        assert_eq!(settlement.applied_split, SplitRates::default());
        assert_eq!(tx.tender().credit_card.cents(), 100_000);
    }
}
