//! # Error Types
//!
//! Domain-specific error types for studio-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                         Error Types                               │
//! │                                                                   │
//! │  studio-core errors (this file)                                   │
//! │  ├── CoreError        - Business rule violations                  │
//! │  └── ValidationError  - User-correctable input failures           │
//! │                                                                   │
//! │  studio-db errors (separate crate)                                │
//! │  ├── DbError          - Database operation failures               │
//! │  └── SettlementError  - Comanda-closing orchestration failures    │
//! │                                                                   │
//! │  Flow: ValidationError → CoreError → SettlementError → Front end  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (amounts, ids, field names)
//! 3. Errors are enum variants, never String
//! 4. A `ValidationError`'s Display text is shown to the user verbatim -
//!    write it for them, not for the log

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations or domain logic failures. They
/// are recoverable except for `IntegrityMismatch`, which signals a defect.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Operation requires an open comanda.
    ///
    /// ## When This Occurs
    /// - Adding/removing items on a closed or cancelled comanda
    /// - Applying a discount after close
    /// - Settling a comanda twice
    #[error("Comanda {id} is {status}, cannot perform operation")]
    ComandaNotOpen { id: String, status: String },

    /// A recomputed settlement does not match the stored/about-to-be-stored
    /// values.
    ///
    /// This is a defect signal, not user error: it means the calculator
    /// changed underneath serialized data, or a row was tampered with.
    /// Never silently corrected - the write is blocked and the mismatch
    /// surfaced.
    #[error("Integrity check failed on {field}: expected {expected} centavos, found {actual}")]
    IntegrityMismatch {
        field: &'static str,
        expected: i64,
        actual: i64,
    },

    /// Comanda has exceeded the maximum allowed line items.
    #[error("Comanda cannot have more than {max} items")]
    TooManyItems { max: usize },

    /// Referenced line item does not exist on the comanda.
    #[error("Item not found on comanda: {0}")]
    ItemNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// User-correctable input errors.
///
/// Each variant is one violated rule. Validation collects every violation
/// before reporting, so the user fixes the whole form in one pass; the
/// Display text is what the form shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// All four payment amounts are zero.
    #[error("Nothing to record: all payment amounts are zero")]
    NothingToRecord,

    /// A payment amount is negative.
    #[error("{field} amount cannot be negative")]
    NegativeAmount { field: &'static str },

    /// Entry date lies in the future.
    #[error("Entry date {date} is in the future")]
    FutureDate { date: String },

    /// Custom split percentages do not sum to 100.
    #[error("Custom split percentages must sum to 100 (got {got_percent})")]
    SplitSumMismatch { got_percent: u32 },

    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comanda_not_open_message() {
        let err = CoreError::ComandaNotOpen {
            id: "c42".to_string(),
            status: "closed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Comanda c42 is closed, cannot perform operation"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::NegativeAmount { field: "cash" };
        assert_eq!(err.to_string(), "cash amount cannot be negative");

        let err = ValidationError::SplitSumMismatch { got_percent: 99 };
        assert_eq!(
            err.to_string(),
            "Custom split percentages must sum to 100 (got 99)"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::NothingToRecord;
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_integrity_mismatch_names_the_field() {
        let err = CoreError::IntegrityMismatch {
            field: "net_total",
            expected: 96_490,
            actual: 96_000,
        };
        assert!(err.to_string().contains("net_total"));
    }
}
