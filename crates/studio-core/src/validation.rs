//! # Validation Module
//!
//! Form sanitization and business rule validation.
//!
//! ## Validation Strategy
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                            │
//! │                                                                   │
//! │  Raw form (strings from the front end)                            │
//! │       │                                                           │
//! │       ▼                                                           │
//! │  sanitize() - repairs SHAPE only                                  │
//! │  ├── missing/unparseable amount → R$0,00                          │
//! │  ├── date string → NaiveDate (or None)                            │
//! │  └── negative amounts pass through UNTOUCHED                      │
//! │       │                                                           │
//! │       ▼                                                           │
//! │  validate() - collects EVERY violated rule                        │
//! │  ├── all amounts zero → "nothing to record"                       │
//! │  ├── any negative amount → one error per field                    │
//! │  ├── future entry date                                            │
//! │  └── custom split not summing to 100                              │
//! │       │                                                           │
//! │       ▼                                                           │
//! │  ValidationReport: the COMPLETE error list, displayed verbatim,   │
//! │  so the user corrects the whole form in one pass                  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sign problems are deliberately a validation failure, not a silent
//! clamp: the operator typed the minus, the operator should see it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::calculator::TenderBreakdown;
use crate::error::ValidationError;
use crate::money::Money;
use crate::rates::{Rate, SplitRates};
use crate::MAX_ITEM_QUANTITY;

/// Result type for single-rule validators.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Date format accepted on the entry form.
const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Raw Form Input
// =============================================================================

/// Custom split percentages exactly as posted: whole percents as strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RawSplitForm {
    pub studio: Option<String>,
    pub professional: Option<String>,
    pub assistant: Option<String>,
}

/// A manual transaction entry exactly as the front end posts it.
///
/// Everything is optional and stringly typed on purpose - this is the
/// boundary where the outside world's mess is allowed to exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RawTransactionForm {
    pub cash: Option<String>,
    pub pix: Option<String>,
    pub debit_card: Option<String>,
    pub credit_card: Option<String>,
    /// Entry date as `YYYY-MM-DD`; empty means "today".
    pub entry_date: Option<String>,
    pub custom_split: Option<RawSplitForm>,
}

// =============================================================================
// Sanitized Draft
// =============================================================================

/// A transaction entry after sanitization: typed, but not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    pub tender: TenderBreakdown,
    /// `None` means "date the entry today at persist time".
    #[ts(as = "Option<String>")]
    pub entry_date: Option<NaiveDate>,
    pub custom_split: Option<SplitRates>,
}

// =============================================================================
// Sanitization
// =============================================================================

/// Coerces a raw form into a typed draft.
///
/// Repairs shape only: a missing or unparseable amount becomes zero, an
/// unparseable date becomes `None` (today). Negative amounts survive -
/// [`validate`] turns them into visible errors.
pub fn sanitize(raw: &RawTransactionForm) -> TransactionDraft {
    TransactionDraft {
        tender: TenderBreakdown {
            cash: sanitize_amount(raw.cash.as_deref()),
            pix: sanitize_amount(raw.pix.as_deref()),
            debit_card: sanitize_amount(raw.debit_card.as_deref()),
            credit_card: sanitize_amount(raw.credit_card.as_deref()),
        },
        entry_date: raw
            .entry_date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()),
        custom_split: raw.custom_split.as_ref().map(sanitize_split),
    }
}

fn sanitize_amount(raw: Option<&str>) -> Money {
    raw.and_then(Money::parse_reais).unwrap_or_else(Money::zero)
}

fn sanitize_split(raw: &RawSplitForm) -> SplitRates {
    SplitRates {
        studio: sanitize_percent(raw.studio.as_deref()),
        professional: sanitize_percent(raw.professional.as_deref()),
        assistant: sanitize_percent(raw.assistant.as_deref()),
    }
}

fn sanitize_percent(raw: Option<&str>) -> Rate {
    let pct = raw
        .and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(0);
    Rate::from_percent(pct)
}

// =============================================================================
// Validation Report
// =============================================================================

/// Every rule a draft violated, in display order.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// True when no rule was violated.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Human-readable messages, one per violated rule, for verbatim
    /// display on the form.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Converts into a Result, keeping the first error as representative.
    pub fn into_result(mut self) -> ValidationResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors.remove(0))
        }
    }
}

/// Joins every message with "; " - a log-friendly one-liner. The UI uses
/// [`ValidationReport::messages`] to render one line per rule instead.
impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

// =============================================================================
// Draft Validation
// =============================================================================

/// Validates a sanitized draft against every business rule at once.
///
/// `today` comes from the caller's clock; a draft dated after it is
/// rejected.
///
/// ## Example
/// ```rust
/// use studio_core::validation::{sanitize, validate, RawTransactionForm};
/// use chrono::NaiveDate;
///
/// let raw = RawTransactionForm {
///     cash: Some("-5".to_string()),
///     entry_date: Some("2099-01-01".to_string()),
///     ..RawTransactionForm::default()
/// };
/// let today = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
///
/// let report = validate(&sanitize(&raw), today);
/// // Negative cash AND future date, reported together.
/// assert_eq!(report.errors.len(), 2);
/// ```
pub fn validate(draft: &TransactionDraft, today: NaiveDate) -> ValidationReport {
    let mut errors = Vec::new();

    if draft.tender.is_zero() {
        errors.push(ValidationError::NothingToRecord);
    }

    for (field, amount) in draft.tender.fields() {
        if amount.is_negative() {
            errors.push(ValidationError::NegativeAmount { field });
        }
    }

    if let Some(date) = draft.entry_date {
        if date > today {
            errors.push(ValidationError::FutureDate {
                date: date.format(DATE_FORMAT).to_string(),
            });
        }
    }

    if let Some(split) = draft.custom_split {
        if !split.sums_to_whole() {
            errors.push(ValidationError::SplitSumMismatch {
                got_percent: split.total_bps() / 100,
            });
        }
    }

    ValidationReport { errors }
}

// =============================================================================
// Single-Rule Validators
// =============================================================================

/// Validates a comanda line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed 999
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a comanda discount.
///
/// Zero is fine (no discount); negative is not. There is deliberately no
/// upper bound - a discount may exceed the item total.
pub fn validate_discount(discount: Money) -> ValidationResult<()> {
    if discount.is_negative() {
        return Err(ValidationError::NegativeAmount { field: "discount" });
    }

    Ok(())
}

/// Validates a unit price (catalog or per-line override).
///
/// ## Rules
/// - Must be non-negative; zero is allowed (courtesy items)
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::NegativeAmount { field: "unit price" });
    }

    Ok(())
}

/// Validates a catalog item name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required { field: "name" });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name",
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    fn raw(cash: &str, pix: &str, debit: &str, credit: &str) -> RawTransactionForm {
        RawTransactionForm {
            cash: Some(cash.to_string()),
            pix: Some(pix.to_string()),
            debit_card: Some(debit.to_string()),
            credit_card: Some(credit.to_string()),
            entry_date: None,
            custom_split: None,
        }
    }

    #[test]
    fn test_sanitize_coerces_garbage_to_zero() {
        let draft = sanitize(&RawTransactionForm {
            cash: Some("abc".to_string()),
            pix: None,
            debit_card: Some("".to_string()),
            credit_card: Some("10,50".to_string()),
            entry_date: Some("not-a-date".to_string()),
            custom_split: None,
        });

        assert!(draft.tender.cash.is_zero());
        assert!(draft.tender.pix.is_zero());
        assert!(draft.tender.debit_card.is_zero());
        assert_eq!(draft.tender.credit_card.cents(), 1050);
        assert_eq!(draft.entry_date, None);
    }

    #[test]
    fn test_sanitize_keeps_negative_amounts() {
        let draft = sanitize(&raw("-5", "0", "0", "0"));
        assert_eq!(draft.tender.cash.cents(), -500);
    }

    #[test]
    fn test_sanitize_parses_date() {
        let mut form = raw("10", "0", "0", "0");
        form.entry_date = Some("2026-02-09".to_string());

        let draft = sanitize(&form);
        assert_eq!(draft.entry_date, NaiveDate::from_ymd_opt(2026, 2, 9));
    }

    #[test]
    fn test_validate_rejects_all_zero() {
        let report = validate(&sanitize(&raw("0", "0", "0", "0")), today());
        assert!(!report.is_valid());
        assert!(matches!(
            report.errors[0],
            ValidationError::NothingToRecord
        ));
    }

    #[test]
    fn test_validate_collects_all_violations() {
        // Negative cash AND a future date: both must be reported in one
        // call so the user fixes the whole form in one pass.
        let mut form = raw("-5", "0", "0", "0");
        form.entry_date = Some("2099-01-01".to_string());

        let report = validate(&sanitize(&form), today());

        assert_eq!(report.errors.len(), 2);
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::NegativeAmount { field: "cash" })));
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::FutureDate { .. })));
    }

    #[test]
    fn test_validate_reports_each_negative_field() {
        let report = validate(&sanitize(&raw("-1", "-2", "0", "5")), today());

        let negatives: Vec<_> = report
            .errors
            .iter()
            .filter(|e| matches!(e, ValidationError::NegativeAmount { .. }))
            .collect();
        assert_eq!(negatives.len(), 2);
    }

    #[test]
    fn test_validate_accepts_today_and_past() {
        let mut form = raw("10", "0", "0", "0");
        form.entry_date = Some("2026-02-10".to_string());
        assert!(validate(&sanitize(&form), today()).is_valid());

        form.entry_date = Some("2025-12-31".to_string());
        assert!(validate(&sanitize(&form), today()).is_valid());
    }

    #[test]
    fn test_validate_custom_split_must_sum_to_100() {
        let mut form = raw("100", "0", "0", "0");
        form.custom_split = Some(RawSplitForm {
            studio: Some("50".to_string()),
            professional: Some("30".to_string()),
            assistant: Some("19".to_string()),
        });

        let report = validate(&sanitize(&form), today());
        assert!(matches!(
            report.errors[0],
            ValidationError::SplitSumMismatch { got_percent: 99 }
        ));

        form.custom_split = Some(RawSplitForm {
            studio: Some("50".to_string()),
            professional: Some("30".to_string()),
            assistant: Some("20".to_string()),
        });
        assert!(validate(&sanitize(&form), today()).is_valid());
    }

    #[test]
    fn test_report_messages_are_displayable() {
        let report = validate(&sanitize(&raw("-5", "0", "0", "0")), today());
        let messages = report.messages();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], "cash amount cannot be negative");
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(Money::zero()).is_ok());
        assert!(validate_discount(Money::from_cents(100_000)).is_ok());
        assert!(validate_discount(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Corte Feminino").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"A".repeat(300)).is_err());
    }
}
