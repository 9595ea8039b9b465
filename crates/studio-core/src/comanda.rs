//! # Comanda Aggregate
//!
//! In-memory comanda math: line snapshots, merge-on-add, discount, and
//! the open-status guard that makes a closed tab immutable.
//!
//! ## Comanda Operations Flow
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                   Comanda Draft Operations                        │
//! │                                                                   │
//! │  Front-end action           Draft change                          │
//! │  ────────────────           ────────────                          │
//! │  Tap service   ───────────► add_line (snapshot name + price)      │
//! │  Change qty    ───────────► update_quantity                       │
//! │  Remove line   ───────────► remove_line                           │
//! │  Apply discount ──────────► set_discount                          │
//! │                                                                   │
//! │  EVERY mutation checks status first: once the comanda is closed   │
//! │  or cancelled it refuses with ComandaNotOpen, leaving the draft   │
//! │  untouched.                                                       │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same totals functions ([`gross_items_total`], [`net_total`]) are
//! used by the persistence layer when it recomputes a stored comanda, so
//! there is exactly one definition of "what a comanda is worth".

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CatalogItem, ComandaItem, ComandaStatus, ItemKind};
use crate::validation::{validate_discount, validate_quantity};
use crate::MAX_COMANDA_ITEMS;

// =============================================================================
// Totals
// =============================================================================

/// Sum of line totals for a set of comanda items.
pub fn gross_items_total<'a, I>(items: I) -> Money
where
    I: IntoIterator<Item = &'a ComandaItem>,
{
    items.into_iter().map(ComandaItem::line_total).sum()
}

/// Net total: gross items minus discount.
///
/// May be negative when the discount exceeds the item total; that is
/// accepted, not guarded.
pub fn net_total(gross_items: Money, discount: Money) -> Money {
    gross_items - discount
}

// =============================================================================
// Draft Line
// =============================================================================

/// One line on an in-memory comanda draft.
///
/// ## Price Freezing
/// Name and price are captured from the catalog at add time. A later
/// catalog re-price must never change what an open tab already shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DraftLine {
    /// Catalog item this line was created from.
    pub catalog_item_id: String,

    /// Service or product.
    pub kind: ItemKind,

    /// Name at time of adding (frozen).
    pub name: String,

    /// Unit price at time of adding, possibly overridden.
    pub unit_price: Money,

    pub quantity: i64,
}

impl DraftLine {
    /// Snapshots a catalog item into a draft line.
    ///
    /// `price_override` replaces the list price for this line only (a
    /// negotiated price, a package rate); the catalog is untouched.
    pub fn from_catalog(
        item: &CatalogItem,
        quantity: i64,
        price_override: Option<Money>,
    ) -> Self {
        DraftLine {
            catalog_item_id: item.id.clone(),
            kind: item.kind,
            name: item.name.clone(),
            unit_price: price_override.unwrap_or_else(|| item.price()),
            quantity,
        }
    }

    /// `quantity × unit_price`.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Comanda Draft
// =============================================================================

/// An in-memory comanda being assembled for one client visit.
///
/// ## Invariants
/// - Lines merge when they share catalog item AND unit price (an
///   overridden price stays its own line)
/// - At most 100 lines, quantity at most 999 per line
/// - Mutations are rejected once status leaves `Open`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ComandaDraft {
    /// Identifier, assigned when the comanda is opened.
    pub id: String,

    pub status: ComandaStatus,

    pub client_name: Option<String>,

    pub professional_name: Option<String>,

    pub lines: Vec<DraftLine>,

    pub discount: Money,
}

impl ComandaDraft {
    /// Opens a new empty draft with a fresh UUID.
    pub fn new() -> Self {
        Self::open(uuid::Uuid::new_v4().to_string())
    }

    /// Opens a new empty draft with a caller-supplied id.
    pub fn open(id: impl Into<String>) -> Self {
        ComandaDraft {
            id: id.into(),
            status: ComandaStatus::Open,
            client_name: None,
            professional_name: None,
            lines: Vec::new(),
            discount: Money::zero(),
        }
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.status == ComandaStatus::Open {
            Ok(())
        } else {
            Err(CoreError::ComandaNotOpen {
                id: self.id.clone(),
                status: self.status.as_str().to_string(),
            })
        }
    }

    /// Adds a catalog item, merging into an existing line when the
    /// catalog item and unit price match.
    pub fn add_line(
        &mut self,
        item: &CatalogItem,
        quantity: i64,
        price_override: Option<Money>,
    ) -> CoreResult<()> {
        self.ensure_open()?;
        validate_quantity(quantity)?;

        let unit_price = price_override.unwrap_or_else(|| item.price());

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.catalog_item_id == item.id && l.unit_price == unit_price)
        {
            let merged = line.quantity + quantity;
            validate_quantity(merged)?;
            line.quantity = merged;
            return Ok(());
        }

        if self.lines.len() >= MAX_COMANDA_ITEMS {
            return Err(CoreError::TooManyItems {
                max: MAX_COMANDA_ITEMS,
            });
        }

        self.lines
            .push(DraftLine::from_catalog(item, quantity, price_override));
        Ok(())
    }

    /// Sets the quantity of the line for `catalog_item_id`; zero removes it.
    pub fn update_quantity(&mut self, catalog_item_id: &str, quantity: i64) -> CoreResult<()> {
        self.ensure_open()?;

        if quantity == 0 {
            return self.remove_line(catalog_item_id);
        }
        validate_quantity(quantity)?;

        match self
            .lines
            .iter_mut()
            .find(|l| l.catalog_item_id == catalog_item_id)
        {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ItemNotFound(catalog_item_id.to_string())),
        }
    }

    /// Removes the line for `catalog_item_id`.
    pub fn remove_line(&mut self, catalog_item_id: &str) -> CoreResult<()> {
        self.ensure_open()?;

        let before = self.lines.len();
        self.lines.retain(|l| l.catalog_item_id != catalog_item_id);

        if self.lines.len() == before {
            Err(CoreError::ItemNotFound(catalog_item_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Applies a flat discount to the whole comanda.
    pub fn set_discount(&mut self, discount: Money) -> CoreResult<()> {
        self.ensure_open()?;
        validate_discount(discount)?;
        self.discount = discount;
        Ok(())
    }

    /// Marks the draft closed. Settlement does this after persisting;
    /// every subsequent mutation attempt fails.
    pub fn close(&mut self) {
        self.status = ComandaStatus::Closed;
    }

    /// Marks the draft cancelled.
    pub fn cancel(&mut self) {
        self.status = ComandaStatus::Cancelled;
    }

    /// Sum of line totals.
    pub fn gross_items_total(&self) -> Money {
        self.lines.iter().map(DraftLine::line_total).sum()
    }

    /// Gross items minus discount. May be negative.
    pub fn net_total(&self) -> Money {
        net_total(self.gross_items_total(), self.discount)
    }

    /// Number of lines on the draft.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Checks if the draft has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for ComandaDraft {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn catalog_item(id: &str, price_cents: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            kind: ItemKind::Service,
            name: format!("Service {id}"),
            price_cents,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_drafts_get_distinct_ids() {
        let a = ComandaDraft::new();
        let b = ComandaDraft::new();
        assert_ne!(a.id, b.id);
        assert!(a.is_empty());
        assert_eq!(a.status, ComandaStatus::Open);
    }

    #[test]
    fn test_add_line_snapshots_price() {
        let mut draft = ComandaDraft::open("c1");
        let mut item = catalog_item("svc", 4500);

        draft.add_line(&item, 1, None).unwrap();

        // Re-pricing the catalog does not touch the open tab.
        item.price_cents = 9900;
        assert_eq!(draft.lines[0].unit_price.cents(), 4500);
    }

    #[test]
    fn test_add_same_item_merges_quantity() {
        let mut draft = ComandaDraft::open("c1");
        let item = catalog_item("svc", 4500);

        draft.add_line(&item, 1, None).unwrap();
        draft.add_line(&item, 2, None).unwrap();

        assert_eq!(draft.line_count(), 1);
        assert_eq!(draft.lines[0].quantity, 3);
        assert_eq!(draft.gross_items_total().cents(), 13_500);
    }

    #[test]
    fn test_price_override_stays_its_own_line() {
        let mut draft = ComandaDraft::open("c1");
        let item = catalog_item("svc", 4500);

        draft.add_line(&item, 1, None).unwrap();
        draft
            .add_line(&item, 1, Some(Money::from_cents(4000)))
            .unwrap();

        assert_eq!(draft.line_count(), 2);
        assert_eq!(draft.gross_items_total().cents(), 8_500);
    }

    #[test]
    fn test_discount_reduces_net() {
        let mut draft = ComandaDraft::open("c1");
        draft.add_line(&catalog_item("svc", 10_000), 1, None).unwrap();

        draft.set_discount(Money::from_cents(1_500)).unwrap();
        assert_eq!(draft.net_total().cents(), 8_500);
    }

    #[test]
    fn test_discount_may_exceed_items() {
        let mut draft = ComandaDraft::open("c1");
        draft.add_line(&catalog_item("svc", 3_000), 1, None).unwrap();

        // Larger than the item total: net goes negative, by design.
        draft.set_discount(Money::from_cents(5_000)).unwrap();
        assert_eq!(draft.net_total().cents(), -2_000);
    }

    #[test]
    fn test_negative_discount_rejected() {
        let mut draft = ComandaDraft::open("c1");
        assert!(draft.set_discount(Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut draft = ComandaDraft::open("c1");
        draft.add_line(&catalog_item("svc", 4500), 2, None).unwrap();

        draft.update_quantity("svc", 0).unwrap();
        assert!(draft.is_empty());
    }

    #[test]
    fn test_closed_draft_is_immutable() {
        let mut draft = ComandaDraft::open("c1");
        let item = catalog_item("svc", 4500);
        draft.add_line(&item, 1, None).unwrap();
        let before = draft.clone();

        draft.close();

        assert!(draft.add_line(&item, 1, None).is_err());
        assert!(draft.set_discount(Money::from_cents(100)).is_err());
        assert!(draft.remove_line("svc").is_err());
        assert!(draft.update_quantity("svc", 5).is_err());

        // Nothing mutated by the failed attempts.
        assert_eq!(draft.lines, before.lines);
        assert_eq!(draft.discount, before.discount);
    }

    #[test]
    fn test_cancelled_draft_is_immutable() {
        let mut draft = ComandaDraft::open("c1");
        draft.cancel();

        let err = draft
            .add_line(&catalog_item("svc", 4500), 1, None)
            .unwrap_err();
        assert!(matches!(err, CoreError::ComandaNotOpen { .. }));
    }

    #[test]
    fn test_quantity_limits() {
        let mut draft = ComandaDraft::open("c1");
        let item = catalog_item("svc", 100);

        assert!(draft.add_line(&item, 1000, None).is_err());
        draft.add_line(&item, 999, None).unwrap();
        // Merging past the cap is also rejected.
        assert!(draft.add_line(&item, 1, None).is_err());
    }
}
