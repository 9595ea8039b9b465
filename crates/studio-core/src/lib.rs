//! # studio-core: Pure Business Logic for Studio POS
//!
//! This crate is the **heart** of Studio POS, the salon management system.
//! It contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     Studio POS Architecture                       │
//! │                                                                   │
//! │  ┌─────────────────────────────────────────────────────────────┐ │
//! │  │                   Front End (React)                         │ │
//! │  │   Agenda ──► Comanda UI ──► Tender UI ──► Dashboard         │ │
//! │  └────────────────────────────┬────────────────────────────────┘ │
//! │                               │                                   │
//! │  ┌────────────────────────────▼────────────────────────────────┐ │
//! │  │              ★ studio-core (THIS CRATE) ★                   │ │
//! │  │                                                             │ │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌────────────┐     │ │
//! │  │  │  money   │ │calculator│ │ comanda  │ │ validation │     │ │
//! │  │  │  Money   │ │ Tender   │ │  Draft   │ │  sanitize  │     │ │
//! │  │  │  Rate    │ │Settlement│ │  totals  │ │  validate  │     │ │
//! │  │  └──────────┘ └──────────┘ └──────────┘ └────────────┘     │ │
//! │  │                                                             │ │
//! │  │  NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS     │ │
//! │  └────────────────────────────┬────────────────────────────────┘ │
//! │                               │                                   │
//! │  ┌────────────────────────────▼────────────────────────────────┐ │
//! │  │                 studio-db (Database Layer)                  │ │
//! │  │          SQLite repositories, atomic settlement             │ │
//! │  └─────────────────────────────────────────────────────────────┘ │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Transaction, Comanda, CatalogItem, ...)
//! - [`money`] - Money type with integer centavo arithmetic (no floats!)
//! - [`rates`] - Fee schedule and revenue split configuration
//! - [`calculator`] - Tender → gross/fees/net/shares settlement math
//! - [`comanda`] - In-memory comanda aggregate (items, discount, totals)
//! - [`validation`] - Form sanitization and business rule validation
//! - [`clock`] - Injectable time source for deterministic tests
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, bit for bit - the
//!    integrity check replays calculations and asserts equality
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are centavos (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use studio_core::calculator::{Calculator, TenderBreakdown};
//! use studio_core::money::Money;
//! use studio_core::rates::CalculatorConfig;
//!
//! let calculator = Calculator::new(CalculatorConfig::default());
//!
//! // R$100.00 paid on credit card
//! let tender = TenderBreakdown {
//!     credit_card: Money::from_cents(10_000),
//!     ..TenderBreakdown::default()
//! };
//!
//! let settlement = calculator.calculate(&tender, None);
//!
//! // 3.51% card fee: R$3.51
//! assert_eq!(settlement.credit_fee.cents(), 351);
//! assert_eq!(settlement.net_total.cents(), 9_649);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod clock;
pub mod comanda;
pub mod error;
pub mod money;
pub mod rates;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use studio_core::Money` instead of
// `use studio_core::money::Money`

pub use calculator::{Calculator, Settlement, TenderBreakdown};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use rates::{CalculatorConfig, FeeSchedule, Rate, SplitRates};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tolerance, in centavos, when matching a tendered total against a
/// comanda's net total at settlement time.
///
/// ## Business Reason
/// Operators type tender amounts by hand; a one-centavo difference from
/// rounding a split payment is accepted rather than bounced back.
pub const SETTLEMENT_TOLERANCE_CENTS: i64 = 1;

/// Maximum line items allowed on a single comanda.
///
/// ## Business Reason
/// Prevents runaway comandas and keeps a single visit's tab reviewable.
pub const MAX_COMANDA_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g. typing 100 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
