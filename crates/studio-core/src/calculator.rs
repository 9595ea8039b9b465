//! # Settlement Calculator
//!
//! Turns a tender breakdown (how a day's revenue or a comanda was paid)
//! into gross/net totals, card fees, and the three-way revenue split.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  TenderBreakdown { cash, pix, debit_card, credit_card }           │
//! │       │                                                           │
//! │       ▼                                                           │
//! │  gross_total = cash + pix + debit + credit                        │
//! │       │                                                           │
//! │       ▼                                                           │
//! │  debit_fee  = debit  × 1,61%   (acquirer fee)                     │
//! │  credit_fee = credit × 3,51%                                      │
//! │       │                                                           │
//! │       ▼                                                           │
//! │  net_total = gross - debit_fee - credit_fee                       │
//! │       │                                                           │
//! │       ▼                                                           │
//! │  studio_share       = net × 60%  ┐  each INDEPENDENT -            │
//! │  professional_share = net × 40%  ├  they are not a partition      │
//! │  assistant_share    = net × 10%  ┘  of net                        │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculator is referentially transparent: identical inputs produce
//! identical [`Settlement`]s, which is what lets [`Calculator::check_integrity`]
//! replay a calculation and compare it field by field against stored data.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::rates::{CalculatorConfig, SplitRates};

// =============================================================================
// Tender Breakdown
// =============================================================================

/// The four payment methods the studio accepts, as fixed fields.
///
/// ## Design Note
/// Deliberately NOT a map keyed by method name: with fixed fields a typo'd
/// key cannot silently contribute zero, and the compiler guarantees every
/// call site accounts for all four methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TenderBreakdown {
    /// Physical cash.
    pub cash: Money,
    /// Pix instant transfer.
    pub pix: Money,
    /// Debit card (1,61% acquirer fee).
    pub debit_card: Money,
    /// Credit card (3,51% acquirer fee).
    pub credit_card: Money,
}

impl TenderBreakdown {
    /// Sum of all four methods.
    pub fn total(&self) -> Money {
        self.cash + self.pix + self.debit_card + self.credit_card
    }

    /// True when every method is zero.
    pub fn is_zero(&self) -> bool {
        self.cash.is_zero()
            && self.pix.is_zero()
            && self.debit_card.is_zero()
            && self.credit_card.is_zero()
    }

    /// Field name/value pairs, in display order.
    ///
    /// Used by validation to report negative amounts per field.
    pub fn fields(&self) -> [(&'static str, Money); 4] {
        [
            ("cash", self.cash),
            ("pix", self.pix),
            ("debit card", self.debit_card),
            ("credit card", self.credit_card),
        ]
    }
}

// =============================================================================
// Settlement
// =============================================================================

/// The full derived result of settling a tender breakdown.
///
/// Every field is computed by [`Calculator::calculate`]; nothing here is
/// ever entered by hand. `applied_split` records which rates produced the
/// shares so the calculation can be replayed from stored data later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    /// Sum of tendered amounts, before fees.
    pub gross_total: Money,
    /// Acquirer fee on the debit card amount.
    pub debit_fee: Money,
    /// Acquirer fee on the credit card amount.
    pub credit_fee: Money,
    /// Gross minus card fees.
    pub net_total: Money,
    /// Studio share of net.
    pub studio_share: Money,
    /// Professional share of net.
    pub professional_share: Money,
    /// Assistant share of net.
    pub assistant_share: Money,
    /// The split rates that produced the shares.
    pub applied_split: SplitRates,
}

// =============================================================================
// Calculator
// =============================================================================

/// Pure settlement calculator.
///
/// ## Usage
/// ```rust
/// use studio_core::calculator::{Calculator, TenderBreakdown};
/// use studio_core::money::Money;
/// use studio_core::rates::CalculatorConfig;
///
/// let calculator = Calculator::new(CalculatorConfig::default());
/// let tender = TenderBreakdown {
///     cash: Money::from_cents(10_000),
///     ..TenderBreakdown::default()
/// };
///
/// let settlement = calculator.calculate(&tender, None);
/// assert_eq!(settlement.gross_total, settlement.net_total); // cash has no fee
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator {
    config: CalculatorConfig,
}

impl Calculator {
    /// Creates a calculator with the given rate configuration.
    pub const fn new(config: CalculatorConfig) -> Self {
        Calculator { config }
    }

    /// Returns the rate configuration in use.
    pub const fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Computes the full settlement for a tender breakdown.
    ///
    /// `custom_split`, when present, replaces the default split rates for
    /// this one calculation. The caller is responsible for validating that
    /// a custom split sums to 100% BEFORE calling - the calculator applies
    /// whatever it is given.
    ///
    /// No side effects, no clock, no randomness: calling twice with the
    /// same arguments yields an identical [`Settlement`].
    pub fn calculate(
        &self,
        tender: &TenderBreakdown,
        custom_split: Option<SplitRates>,
    ) -> Settlement {
        let split = custom_split.unwrap_or(self.config.default_split);

        let gross_total = tender.total();
        let debit_fee = tender.debit_card.apply_rate(self.config.fees.debit);
        let credit_fee = tender.credit_card.apply_rate(self.config.fees.credit);
        let net_total = gross_total - debit_fee - credit_fee;

        Settlement {
            gross_total,
            debit_fee,
            credit_fee,
            net_total,
            studio_share: net_total.apply_rate(split.studio),
            professional_share: net_total.apply_rate(split.professional),
            assistant_share: net_total.apply_rate(split.assistant),
            applied_split: split,
        }
    }

    /// Replays a calculation and asserts that every derived field matches
    /// `stored`.
    ///
    /// ## Why This Exists
    /// Settled values are persisted; the calculator evolves. Before any
    /// write - and on demand against old rows - the calculation is redone
    /// from the raw inputs and compared field by field. A mismatch means a
    /// real defect (calculator drift, schema mix-up, tampered row) and
    /// fails loudly rather than being silently "fixed".
    pub fn check_integrity(
        &self,
        tender: &TenderBreakdown,
        custom_split: Option<SplitRates>,
        stored: &Settlement,
    ) -> CoreResult<()> {
        let expected = self.calculate(tender, custom_split);

        let comparisons: [(&'static str, Money, Money); 7] = [
            ("gross_total", expected.gross_total, stored.gross_total),
            ("debit_fee", expected.debit_fee, stored.debit_fee),
            ("credit_fee", expected.credit_fee, stored.credit_fee),
            ("net_total", expected.net_total, stored.net_total),
            ("studio_share", expected.studio_share, stored.studio_share),
            (
                "professional_share",
                expected.professional_share,
                stored.professional_share,
            ),
            (
                "assistant_share",
                expected.assistant_share,
                stored.assistant_share,
            ),
        ];

        for (field, want, got) in comparisons {
            if want != got {
                return Err(CoreError::IntegrityMismatch {
                    field,
                    expected: want.cents(),
                    actual: got.cents(),
                });
            }
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
    use crate::rates::{FeeSchedule, Rate};

    fn calculator() -> Calculator {
        Calculator::new(CalculatorConfig::default())
    }

    fn tender(cash: i64, pix: i64, debit: i64, credit: i64) -> TenderBreakdown {
        TenderBreakdown {
            cash: Money::from_cents(cash),
            pix: Money::from_cents(pix),
            debit_card: Money::from_cents(debit),
            credit_card: Money::from_cents(credit),
        }
    }

    #[test]
    fn test_gross_is_sum_of_methods() {
        let result = calculator().calculate(&tender(1000, 2500, 4000, 2500), None);
        assert_eq!(result.gross_total.cents(), 10_000);
    }

    #[test]
    fn test_debit_fee() {
        // R$100,00 debit → R$1,61 fee
        let result = calculator().calculate(&tender(0, 0, 10_000, 0), None);
        assert_eq!(result.debit_fee.cents(), 161);
        assert_eq!(result.credit_fee.cents(), 0);
        assert_eq!(result.net_total.cents(), 9_839);
    }

    #[test]
    fn test_credit_fee() {
        // R$100,00 credit → R$3,51 fee
        let result = calculator().calculate(&tender(0, 0, 0, 10_000), None);
        assert_eq!(result.credit_fee.cents(), 351);
        assert_eq!(result.debit_fee.cents(), 0);
        assert_eq!(result.net_total.cents(), 9_649);
    }

    #[test]
    fn test_net_is_gross_minus_fees() {
        let result = calculator().calculate(&tender(5000, 5000, 10_000, 10_000), None);
        assert_eq!(
            result.net_total,
            result.gross_total - result.debit_fee - result.credit_fee
        );
    }

    #[test]
    fn test_cash_and_pix_carry_no_fee() {
        let result = calculator().calculate(&tender(7000, 3000, 0, 0), None);
        assert_eq!(result.gross_total, result.net_total);
        assert!(result.debit_fee.is_zero());
        assert!(result.credit_fee.is_zero());
    }

    #[test]
    fn test_default_split_is_independent() {
        // R$1000,00 on credit: net = 100000 - 3510 = 96490
        let result = calculator().calculate(&tender(0, 0, 0, 100_000), None);
        assert_eq!(result.net_total.cents(), 96_490);

        // Each share is its own percentage of net.
        assert_eq!(result.studio_share.cents(), 57_894); // 60%
        assert_eq!(result.professional_share.cents(), 38_596); // 40%
        assert_eq!(result.assistant_share.cents(), 9_649); // 10%

        // Their sum exceeds net: 110% of net, not a partition.
        let share_sum =
            result.studio_share + result.professional_share + result.assistant_share;
        assert!(share_sum > result.net_total);
        assert_eq!(share_sum.cents(), 106_139);
    }

    #[test]
    fn test_custom_split_replaces_defaults() {
        let custom = SplitRates::from_percents(50, 30, 20);
        let result = calculator().calculate(&tender(0, 0, 0, 100_000), Some(custom));

        assert_eq!(result.studio_share.cents(), 48_245); // 50% of 96490
        assert_eq!(result.professional_share.cents(), 28_947); // 30%
        assert_eq!(result.assistant_share.cents(), 19_298); // 20%
        assert_eq!(result.applied_split, custom);
    }

    #[test]
    fn test_calculate_is_idempotent() {
        let calc = calculator();
        let t = tender(1234, 5678, 9012, 3456);

        let first = calc.calculate(&t, None);
        let second = calc.calculate(&t, None);

        // Structural equality across every derived field.
        assert_eq!(first, second);
    }

    #[test]
    fn test_alternate_fee_schedule() {
        let config = CalculatorConfig {
            fees: FeeSchedule {
                debit: Rate::from_bps(100),  // 1%
                credit: Rate::from_bps(200), // 2%
            },
            ..CalculatorConfig::default()
        };
        let result = Calculator::new(config).calculate(&tender(0, 0, 10_000, 10_000), None);

        assert_eq!(result.debit_fee.cents(), 100);
        assert_eq!(result.credit_fee.cents(), 200);
    }

    #[test]
    fn test_integrity_check_passes_on_replay() {
        let calc = calculator();
        let t = tender(0, 15_000, 0, 10_000);
        let stored = calc.calculate(&t, None);

        assert!(calc.check_integrity(&t, None, &stored).is_ok());
    }

    #[test]
    fn test_integrity_check_fails_on_tampered_field() {
        let calc = calculator();
        let t = tender(0, 0, 0, 100_000);
        let mut stored = calc.calculate(&t, None);
        stored.net_total = Money::from_cents(96_000); // tampered

        let err = calc.check_integrity(&t, None, &stored).unwrap_err();
        match err {
            CoreError::IntegrityMismatch {
                field,
                expected,
                actual,
            } => {
                assert_eq!(field, "net_total");
                assert_eq!(expected, 96_490);
                assert_eq!(actual, 96_000);
            }
            other => panic!("expected IntegrityMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_integrity_check_fails_on_wrong_split() {
        let calc = calculator();
        let t = tender(0, 0, 0, 100_000);
        let stored = calc.calculate(&t, Some(SplitRates::from_percents(50, 30, 20)));

        // Replaying with the defaults must not match.
        assert!(calc.check_integrity(&t, None, &stored).is_err());
    }

    #[test]
    fn test_settlement_serializes_camel_case() {
        // The front end reads these keys; renaming a field is a wire
        // contract change.
        let result = calculator().calculate(&tender(0, 0, 0, 10_000), None);
        let json = serde_json::to_value(result).unwrap();

        assert_eq!(json["grossTotal"], 10_000);
        assert_eq!(json["creditFee"], 351);
        assert_eq!(json["netTotal"], 9_649);
        assert!(json.get("studioShare").is_some());
    }

    #[test]
    fn test_zero_tender_settles_to_all_zeros() {
        let result = calculator().calculate(&TenderBreakdown::default(), None);
        assert!(result.gross_total.is_zero());
        assert!(result.net_total.is_zero());
        assert!(result.studio_share.is_zero());
    }
}
