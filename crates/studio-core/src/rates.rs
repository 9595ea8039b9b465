//! # Rates Module
//!
//! Fee schedule and revenue split configuration.
//!
//! ## The Numbers
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  CARD FEES (charged by the acquirer, deducted from gross)         │
//! │    Debit card:   1,61%                                            │
//! │    Credit card:  3,51%                                            │
//! │                                                                   │
//! │  REVENUE SPLIT (each an INDEPENDENT percentage of net total)      │
//! │    Studio:        60%                                             │
//! │    Professional:  40%                                             │
//! │    Assistant:     10%                                             │
//! │                                                                   │
//! │  The defaults sum to 110% on purpose: the assistant share is an   │
//! │  extra commission computed on net, not a slice carved out of the  │
//! │  studio/professional split. A per-transaction override must sum   │
//! │  to exactly 100.                                                  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All of this lives in [`CalculatorConfig`], an explicit value object
//! handed to the calculator. No module-level mutable state: tests can run
//! alternate fee schedules side by side.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 161 bps = 1.61% (the debit card fee)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a whole percentage (60 means 60%).
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        Rate(pct * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Fee Schedule
// =============================================================================

/// Card-processing fees deducted from gross revenue.
///
/// Cash and Pix clear at face value; only the two card methods carry an
/// acquirer fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeSchedule {
    /// Fee on debit card amounts.
    pub debit: Rate,
    /// Fee on credit card amounts.
    pub credit: Rate,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        FeeSchedule {
            debit: Rate::from_bps(161),  // 1,61%
            credit: Rate::from_bps(351), // 3,51%
        }
    }
}

// =============================================================================
// Split Rates
// =============================================================================

/// The three-way revenue split applied to a transaction's net total.
///
/// Each rate is applied to net total **independently** - this is not a
/// partition. `studio + professional + assistant` may exceed 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SplitRates {
    /// Studio (house) share of net total.
    pub studio: Rate,
    /// Professional (stylist) share of net total.
    pub professional: Rate,
    /// Assistant share of net total.
    pub assistant: Rate,
}

impl SplitRates {
    /// Creates split rates from whole percentages.
    pub const fn from_percents(studio: u32, professional: u32, assistant: u32) -> Self {
        SplitRates {
            studio: Rate::from_percent(studio),
            professional: Rate::from_percent(professional),
            assistant: Rate::from_percent(assistant),
        }
    }

    /// Sum of the three rates in basis points.
    pub const fn total_bps(&self) -> u32 {
        self.studio.bps() + self.professional.bps() + self.assistant.bps()
    }

    /// Whether the three rates sum to exactly 100%.
    ///
    /// Required for per-transaction overrides; the defaults intentionally
    /// do not satisfy it.
    pub const fn sums_to_whole(&self) -> bool {
        self.total_bps() == 10_000
    }
}

impl Default for SplitRates {
    fn default() -> Self {
        SplitRates::from_percents(60, 40, 10)
    }
}

// =============================================================================
// Calculator Configuration
// =============================================================================

/// Everything the settlement calculator needs to know about rates.
///
/// ## Usage
/// ```rust
/// use studio_core::rates::{CalculatorConfig, FeeSchedule, Rate};
///
/// // Production: the defaults
/// let config = CalculatorConfig::default();
///
/// // A test exercising a different acquirer contract
/// let alt = CalculatorConfig {
///     fees: FeeSchedule { debit: Rate::from_bps(99), credit: Rate::from_bps(249) },
///     ..CalculatorConfig::default()
/// };
/// # let _ = (config, alt);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, TS)]
#[ts(export)]
pub struct CalculatorConfig {
    /// Card fees deducted from gross.
    pub fees: FeeSchedule,
    /// Split applied when a transaction carries no override.
    pub default_split: SplitRates,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_from_percent() {
        let rate = Rate::from_percent(60);
        assert_eq!(rate.bps(), 6000);
        assert!((rate.percent() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_fees() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.debit.bps(), 161);
        assert_eq!(fees.credit.bps(), 351);
    }

    #[test]
    fn test_default_split_exceeds_whole() {
        let split = SplitRates::default();
        assert_eq!(split.total_bps(), 11_000); // 110%: independent shares
        assert!(!split.sums_to_whole());
    }

    #[test]
    fn test_custom_split_sums_to_whole() {
        assert!(SplitRates::from_percents(50, 30, 20).sums_to_whole());
        assert!(!SplitRates::from_percents(50, 30, 19).sums_to_whole());
    }
}
