//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                       │
//! │                                                                   │
//! │  In JavaScript/floating point:                                    │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                     │
//! │                                                                   │
//! │  A month of card fees computed in floats drifts off the           │
//! │  statement by whole centavos, and the reconciliation dashboard    │
//! │  flags phantom differences.                                       │
//! │                                                                   │
//! │  OUR SOLUTION: Integer Centavos                                   │
//! │    R$10,99 is stored as 1099. Every derived value is rounded      │
//! │    to a whole centavo exactly once, at the point it is computed.  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use studio_core::money::Money;
//! use studio_core::rates::Rate;
//!
//! // Create from centavos (preferred)
//! let price = Money::from_cents(1099); // R$10,99
//!
//! // Arithmetic operations
//! let doubled = price * 2;                      // R$21,98
//! let total = price + Money::from_cents(500);   // R$15,99
//!
//! // Percentage application (fees, shares) rounds half-up
//! let fee = Money::from_cents(10_000).apply_rate(Rate::from_bps(161));
//! assert_eq!(fee.cents(), 161); // R$1,61
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::rates::Rate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos for BRL).
///
/// ## Design Decisions
/// - **i64 (signed)**: negative values exist transiently (a discount larger
///   than a comanda's item total) and must be representable
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
///
/// EVERY monetary value in the system flows through this type: catalog
/// prices, comanda line totals, tendered amounts, card fees, and the
/// studio/professional/assistant shares on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use studio_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // R$10,99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from reais and centavos.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_reais(-5, 50)` = -R$5,50, not -R$4,50.
    #[inline]
    pub const fn from_reais(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Parses a user-entered amount string into Money.
    ///
    /// Accepts both decimal separators ("12,34" and "12.34"), an optional
    /// leading minus, and at most two decimal places. Returns `None` for
    /// anything else - the caller decides whether that means "zero" (form
    /// sanitization) or "error".
    ///
    /// ## Example
    /// ```rust
    /// use studio_core::money::Money;
    ///
    /// assert_eq!(Money::parse_reais("12,34"), Some(Money::from_cents(1234)));
    /// assert_eq!(Money::parse_reais("12.5"), Some(Money::from_cents(1250)));
    /// assert_eq!(Money::parse_reais("-3"), Some(Money::from_cents(-300)));
    /// assert_eq!(Money::parse_reais("abc"), None);
    /// ```
    pub fn parse_reais(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        // Normalize the Brazilian comma separator before splitting.
        let normalized = digits.replace(',', ".");
        let mut parts = normalized.splitn(2, '.');

        let major_part = parts.next()?;
        let minor_part = parts.next().unwrap_or("");

        if major_part.is_empty() && minor_part.is_empty() {
            return None;
        }
        if !major_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if minor_part.len() > 2 || !minor_part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let major: i64 = if major_part.is_empty() {
            0
        } else {
            major_part.parse().ok()?
        };

        // "12.5" means fifty centavos, not five.
        let minor: i64 = match minor_part.len() {
            0 => 0,
            1 => minor_part.parse::<i64>().ok()? * 10,
            _ => minor_part.parse().ok()?,
        };

        let cents = major.checked_mul(100)?.checked_add(minor)?;
        Some(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (reais) portion.
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (centavos) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Applies a percentage rate and returns the rounded result.
    ///
    /// This single function carries all percentage math in the system:
    /// card fees (1.61% / 3.51%) and the three revenue shares.
    ///
    /// ## Implementation
    /// Integer math in i128 to prevent overflow: `(cents * bps + 5000) /
    /// 10000`. The +5000 rounds half-up at the centavo. Whole-percent
    /// rates applied to two-decimal amounts divide evenly, so the common
    /// cases are exact:
    ///
    /// ```text
    /// R$100,00 × 1,61% = R$1,61      (debit fee, exact)
    /// R$964,90 × 60%   = R$578,94    (studio share, exact)
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use studio_core::money::Money;
    /// use studio_core::rates::Rate;
    ///
    /// let net = Money::from_cents(96_490); // R$964,90
    /// assert_eq!(net.apply_rate(Rate::from_percent(60)).cents(), 57_894);
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10_000;
        Money::from_cents(cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ```text
    /// Service: Escova R$45,00 × qty 2 ──► line total R$90,00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Use front-end formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}R${},{:02}", sign, self.reais().abs(), self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Sums an iterator of Money values.
impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
