//! # Validation Module
//!
//! Field validators and the result accumulator every entity validator fills.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Field validators (THIS MODULE)                               │
//! │  ├── required, number, date, status, product_code                      │
//! │  └── one value in, FieldResult<normalized value> out                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Entity validators (inventory.rs)                             │
//! │  ├── run field validators over a whole record                          │
//! │  └── cross-record rules: duplicates, stock sufficiency                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: ValidationResult                                             │
//! │  └── ordered errors + warnings, is_valid derived from errors           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invalid input is always a returned error, never a panic.
//!
//! ## Usage
//! ```rust
//! use stockwise_core::types::FieldValue;
//! use stockwise_core::validation::{number, NumberRules};
//!
//! let qty = FieldValue::from("12.5");
//! assert_eq!(number(Some(&qty), "Quantity", &NumberRules::default()), Ok(12.5));
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;

use crate::dates::{self, format_date, parse_date};
use crate::error::{ErrorKind, ValidationError, ValidationWarning};
use crate::types::{EntryStatus, FieldValue, DEFAULT_STATUSES};

/// Result type for a single field validator.
pub type FieldResult<T> = Result<T, ValidationError>;

// =============================================================================
// Validation Result
// =============================================================================

/// Ordered errors and warnings for one validation call.
///
/// ## Invariant
/// `is_valid() == errors().is_empty()` at every observation point. The only
/// way to add an error is [`add_error`](Self::add_error), and nothing removes
/// one, so a result that went invalid stays invalid.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// A fresh, valid result.
    pub fn new() -> Self {
        ValidationResult {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Records a field validator's outcome, returning the value on success.
    pub fn check<T>(&mut self, outcome: FieldResult<T>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(error) => {
                self.add_error(error);
                None
            }
        }
    }

    /// Appends another result's errors and warnings, in order.
    pub fn merge(&mut self, other: ValidationResult) {
        for error in other.errors {
            self.add_error(error);
        }
        self.warnings.extend(other.warnings);
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn first_error(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    /// Errors recorded against one field.
    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.field() == field)
    }

    /// Kinds of all errors, in order.
    pub fn error_kinds(&self) -> Vec<ErrorKind> {
        self.errors.iter().map(ValidationError::kind).collect()
    }

    /// True if any error has the given kind.
    pub fn has_error_kind(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind() == kind)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Required
// =============================================================================

/// Fails for a missing value or an all-whitespace string.
///
/// `0` and `false` are present values and pass.
pub fn required<'a>(value: Option<&'a FieldValue>, field: &str) -> FieldResult<&'a FieldValue> {
    match value {
        Some(v) if !v.is_blank() => Ok(v),
        _ => Err(ValidationError::required(field)),
    }
}

// =============================================================================
// Number
// =============================================================================

/// Options for [`number`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberRules {
    pub min: f64,
    pub max: f64,
    pub allow_zero: bool,
    pub allow_negative: bool,
}

impl Default for NumberRules {
    fn default() -> Self {
        NumberRules {
            min: 0.0,
            max: f64::INFINITY,
            allow_zero: true,
            allow_negative: false,
        }
    }
}

impl NumberRules {
    /// Quantity rules used by every entity validator: strictly positive, min 0.01.
    pub const fn quantity() -> Self {
        NumberRules {
            min: 0.01,
            max: f64::INFINITY,
            allow_zero: false,
            allow_negative: false,
        }
    }
}

/// Validates a numeric value.
///
/// ## Check Order (first failure wins)
/// ```text
/// empty            → REQUIRED_FIELD
/// not a number     → INVALID_NUMBER
/// zero, !allowZero → INVALID_NUMBER
/// < 0, !allowNeg   → NEGATIVE_NUMBER
/// outside min..max → INVALID_NUMBER
/// ```
pub fn number(value: Option<&FieldValue>, field: &str, rules: &NumberRules) -> FieldResult<f64> {
    let value = required(value, field)?;

    let n = value
        .as_number()
        .ok_or_else(|| ValidationError::invalid_number(field))?;

    if n == 0.0 && !rules.allow_zero {
        return Err(ValidationError::zero_not_allowed(field));
    }

    if n < 0.0 && !rules.allow_negative {
        return Err(ValidationError::negative(field));
    }

    if n < rules.min || n > rules.max {
        return Err(ValidationError::out_of_range(field, rules.min, rules.max));
    }

    Ok(n)
}

// =============================================================================
// Date
// =============================================================================

/// Options for [`date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRules {
    pub allow_future: bool,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl Default for DateRules {
    fn default() -> Self {
        DateRules {
            allow_future: true,
            min_date: None,
            max_date: None,
        }
    }
}

impl DateRules {
    /// Entry dates: today or earlier.
    pub const fn no_future() -> Self {
        DateRules {
            allow_future: false,
            min_date: None,
            max_date: None,
        }
    }
}

/// Validates a date against the local clock. Returns `YYYY-MM-DD`.
pub fn date(value: Option<&FieldValue>, field: &str, rules: &DateRules) -> FieldResult<String> {
    date_on(value, field, rules, dates::today())
}

/// [`date`] with an explicit "today".
///
/// A date is in the future when it falls after the end of `today`.
pub fn date_on(
    value: Option<&FieldValue>,
    field: &str,
    rules: &DateRules,
    today: NaiveDate,
) -> FieldResult<String> {
    let value = required(value, field)?;

    let parsed = match value {
        FieldValue::Text(raw) => parse_date(raw),
        _ => None,
    }
    .ok_or_else(|| ValidationError::invalid_date(field))?;

    if !rules.allow_future && parsed > today {
        return Err(ValidationError::future_date(field));
    }

    if let Some(min) = rules.min_date {
        if parsed < min {
            return Err(ValidationError::date_before(field, &format_date(min)));
        }
    }

    if let Some(max) = rules.max_date {
        if parsed > max {
            return Err(ValidationError::date_after(field, &format_date(max)));
        }
    }

    Ok(format_date(parsed))
}

// =============================================================================
// Status
// =============================================================================

/// Validates a status against the default set (Pending, Completed, Cancelled).
pub fn status(value: Option<&FieldValue>, field: &str) -> FieldResult<EntryStatus> {
    status_in(value, field, &DEFAULT_STATUSES)
}

/// Validates a status against an explicit allowed set.
pub fn status_in(
    value: Option<&FieldValue>,
    field: &str,
    allowed: &[EntryStatus],
) -> FieldResult<EntryStatus> {
    let value = required(value, field)?;

    value
        .to_text()
        .trim()
        .parse::<EntryStatus>()
        .ok()
        .filter(|s| allowed.contains(s))
        .ok_or_else(|| {
            let names: Vec<String> = allowed.iter().map(ToString::to_string).collect();
            ValidationError::invalid_status(field, &names)
        })
}

// =============================================================================
// Product Code
// =============================================================================

/// Validates a product/item code. Returns the trimmed code.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - Only letters, digits, `-`, `_` and `.`
///
/// ## Example
/// ```rust
/// use stockwise_core::types::FieldValue;
/// use stockwise_core::validation::product_code;
///
/// let code = FieldValue::from("  RM-001.A ");
/// assert_eq!(product_code(Some(&code), "Product Code").unwrap(), "RM-001.A");
/// assert!(product_code(Some(&FieldValue::from("RM 001")), "Product Code").is_err());
/// ```
pub fn product_code(value: Option<&FieldValue>, field: &str) -> FieldResult<String> {
    let value = required(value, field)?;
    let text = value.to_text();
    let code = text.trim();

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(ValidationError::invalid_product_code(field));
    }

    Ok(code.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn v(value: impl Into<FieldValue>) -> FieldValue {
        value.into()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_result_starts_valid() {
        let result = ValidationResult::new();
        assert!(result.is_valid());
        assert!(result.errors().is_empty());
    }

    #[test]
    fn test_result_stays_invalid_after_warning() {
        let mut result = ValidationResult::new();
        result.add_error(ValidationError::required("Date"));
        assert!(!result.is_valid());

        result.add_warning(ValidationWarning::new("Quantity", "large"));
        assert!(!result.is_valid());
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let mut result = ValidationResult::new();
        result.add_warning(ValidationWarning::new("Quantity", "large"));
        assert!(result.is_valid());
        assert!(result.has_warnings());
    }

    #[test]
    fn test_merge_preserves_order() {
        let mut a = ValidationResult::new();
        a.add_error(ValidationError::required("Date"));
        let mut b = ValidationResult::new();
        b.add_error(ValidationError::negative("Quantity"));
        b.add_warning(ValidationWarning::new("itemCode", "unknown"));

        a.merge(b);
        assert_eq!(
            a.error_kinds(),
            vec![ErrorKind::RequiredField, ErrorKind::NegativeNumber]
        );
        assert_eq!(a.warnings().len(), 1);
        assert_eq!(a.errors_for("Quantity").count(), 1);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let mut result = ValidationResult::new();
        result.add_error(ValidationError::required("Date"));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["errors"][0]["type"], "REQUIRED_FIELD");
    }

    #[test]
    fn test_required_boundaries() {
        assert!(required(Some(&v(0.0)), "Quantity").is_ok());
        assert!(required(Some(&v(false)), "Flag").is_ok());
        assert!(required(Some(&v("x")), "Name").is_ok());

        assert!(required(None, "Name").is_err());
        assert!(required(Some(&v("")), "Name").is_err());
        assert!(required(Some(&v("   ")), "Name").is_err());
    }

    #[test]
    fn test_number_check_order() {
        let rules = NumberRules {
            allow_zero: false,
            ..NumberRules::default()
        };
        let kind = |value: Option<&FieldValue>| number(value, "Quantity", &rules).unwrap_err().kind();

        assert_eq!(kind(None), ErrorKind::RequiredField);
        assert_eq!(kind(Some(&v("abc"))), ErrorKind::InvalidNumber);
        assert_eq!(kind(Some(&v("0"))), ErrorKind::InvalidNumber);
        assert_eq!(kind(Some(&v(-5.0))), ErrorKind::NegativeNumber);
    }

    #[test]
    fn test_number_range() {
        let rules = NumberRules {
            min: 1.0,
            max: 10.0,
            ..NumberRules::default()
        };
        assert_eq!(number(Some(&v("10")), "Qty", &rules), Ok(10.0));
        assert_eq!(
            number(Some(&v(11.0)), "Qty", &rules).unwrap_err().message(),
            "Qty must be between 1 and 10"
        );
        assert_eq!(
            number(Some(&v(0.5)), "Qty", &rules).unwrap_err().kind(),
            ErrorKind::InvalidNumber
        );
    }

    #[test]
    fn test_number_allows_negative_when_asked() {
        let rules = NumberRules {
            min: -100.0,
            allow_negative: true,
            ..NumberRules::default()
        };
        assert_eq!(number(Some(&v("-5")), "Adjustment", &rules), Ok(-5.0));
    }

    #[test]
    fn test_number_zero_allowed_by_default() {
        assert_eq!(number(Some(&v(0.0)), "Qty", &NumberRules::default()), Ok(0.0));
    }

    #[test]
    fn test_quantity_rules() {
        let rules = NumberRules::quantity();
        assert_eq!(number(Some(&v("0.01")), "Quantity", &rules), Ok(0.01));
        assert_eq!(
            number(Some(&v("0.001")), "Quantity", &rules).unwrap_err().kind(),
            ErrorKind::InvalidNumber
        );
    }

    #[test]
    fn test_date_normalizes() {
        let today = ymd(2024, 6, 1);
        assert_eq!(
            date_on(Some(&v("01/15/2024")), "Date", &DateRules::default(), today),
            Ok("2024-01-15".to_string())
        );
    }

    #[test]
    fn test_date_future_rules() {
        let today = ymd(2024, 6, 1);
        let rules = DateRules::no_future();

        assert!(date_on(Some(&v("2024-06-01")), "Date", &rules, today).is_ok());
        assert!(date_on(Some(&v("2024-06-01T23:59:59")), "Date", &rules, today).is_ok());
        assert_eq!(
            date_on(Some(&v("2024-06-02")), "Date", &rules, today).unwrap_err().kind(),
            ErrorKind::FutureDate
        );
        assert!(date_on(Some(&v("2024-06-02")), "Date", &DateRules::default(), today).is_ok());
    }

    #[test]
    fn test_far_future_date_rejected_on_real_clock() {
        let err = date(Some(&v("9999-01-01")), "Date", &DateRules::no_future()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FutureDate);
    }

    #[test]
    fn test_date_window() {
        let today = ymd(2024, 6, 1);
        let rules = DateRules {
            min_date: Some(ymd(2024, 1, 1)),
            max_date: Some(ymd(2024, 3, 31)),
            ..DateRules::default()
        };
        assert!(date_on(Some(&v("2024-02-10")), "Date", &rules, today).is_ok());
        assert_eq!(
            date_on(Some(&v("2023-12-31")), "Date", &rules, today).unwrap_err().message(),
            "Date must be on or after 2024-01-01"
        );
        assert_eq!(
            date_on(Some(&v("2024-04-01")), "Date", &rules, today).unwrap_err().kind(),
            ErrorKind::InvalidDate
        );
    }

    #[test]
    fn test_date_invalid_and_missing() {
        let today = ymd(2024, 6, 1);
        let rules = DateRules::default();
        assert_eq!(
            date_on(None, "Date", &rules, today).unwrap_err().kind(),
            ErrorKind::RequiredField
        );
        assert_eq!(
            date_on(Some(&v("yesterday")), "Date", &rules, today).unwrap_err().kind(),
            ErrorKind::InvalidDate
        );
        assert_eq!(
            date_on(Some(&v(20240115.0)), "Date", &rules, today).unwrap_err().kind(),
            ErrorKind::InvalidDate
        );
    }

    #[test]
    fn test_status() {
        assert_eq!(status(Some(&v("Pending")), "Status"), Ok(EntryStatus::Pending));
        assert_eq!(
            status(Some(&v("Shipped")), "Status").unwrap_err().kind(),
            ErrorKind::InvalidStatus
        );
        assert_eq!(
            status(Some(&v(" ")), "Status").unwrap_err().kind(),
            ErrorKind::RequiredField
        );
        assert_eq!(
            status_in(Some(&v("Cancelled")), "Status", &[EntryStatus::Pending])
                .unwrap_err()
                .message(),
            "Status must be one of: Pending"
        );
    }

    #[test]
    fn test_product_code() {
        assert_eq!(product_code(Some(&v(" FG_01 ")), "Product Code"), Ok("FG_01".to_string()));
        assert_eq!(product_code(Some(&v(1001.0)), "Product Code"), Ok("1001".to_string()));
        assert_eq!(
            product_code(Some(&v("   ")), "Product Code").unwrap_err().kind(),
            ErrorKind::RequiredField
        );
        assert!(product_code(Some(&v("RM#1")), "Product Code").is_err());
    }

    #[test]
    fn test_validators_are_idempotent() {
        let value = v("2024-01-15");
        let first = date_on(Some(&value), "Date", &DateRules::no_future(), ymd(2024, 6, 1));
        let second = date_on(Some(&value), "Date", &DateRules::no_future(), ymd(2024, 6, 1));
        assert_eq!(first, second);

        let qty = v("-1");
        assert_eq!(
            number(Some(&qty), "Q", &NumberRules::default()),
            number(Some(&qty), "Q", &NumberRules::default())
        );
    }
}
