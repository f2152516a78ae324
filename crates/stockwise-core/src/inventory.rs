//! # Entity Validators
//!
//! Whole-record validation for the four inventory registers.
//!
//! ## Shared Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record ──► required(...) over the register's fixed field list          │
//! │        ──► date(Date, allow_future = false)                            │
//! │        ──► number(Quantity, min 0.01, no zero, no negatives)           │
//! │        ──► status(Status)           only when a status is present      │
//! │        ──► register-specific rules (below)                             │
//! │        ──► ValidationResult                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing value is reported once, by `required`; the typed validators
//! only look at values that are present.
//!
//! ## Register Rules
//! ```text
//! Material Inward   product code format, DUPLICATE_ENTRY on (Date, Code, Supplier)
//! Material Issue    INSUFFICIENT_STOCK when Completed and qty > stock[itemCode]
//! FG Inward         product code format, PRODUCT_NOT_FOUND outside the FG sheet
//! FG Outward        PRODUCT_NOT_FOUND, INSUFFICIENT_STOCK when Completed
//! ```
//!
//! ## Status-Gated Stock Check
//! Stock is only consumed when an entry is `Completed`. A `Pending` entry is
//! reserved demand: it is never rejected for exceeding stock, it only gets a
//! warning. Do not turn this into an unconditional quantity check.

use chrono::NaiveDate;

use crate::dates::{self, format_date, parse_date};
use crate::error::{ValidationError, ValidationWarning};
use crate::types::{
    ComparisonData, EntryStatus, FgMaterialInward, FgMaterialOutward, FgStockEntry, FieldValue,
    InventoryRecord, MaterialInward, MaterialIssue, StockLevels, DEFAULT_STATUSES,
};
use crate::validation::{
    date_on, number, product_code, required, status_in, DateRules, NumberRules, ValidationResult,
};

// =============================================================================
// Field Names
// =============================================================================

/// Sheet column names, used as error field keys.
pub mod fields {
    pub const DATE: &str = "Date";
    pub const PRODUCT_CODE: &str = "Product Code";
    pub const PRODUCT_NAME: &str = "Product Name";
    pub const SUPPLIER: &str = "Supplier";
    pub const QUANTITY: &str = "Quantity";
    pub const STATUS: &str = "Status";
    pub const ITEM_CODE: &str = "itemCode";
    pub const ITEM_NAME: &str = "itemName";
    pub const ISSUED_TO: &str = "Issued To";
    pub const CUSTOMER: &str = "Customer";
}

use fields::*;

// =============================================================================
// Validation Context
// =============================================================================

/// The clock and status set an entity validation runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    /// Dates after this day are in the future.
    pub today: NaiveDate,
    /// Statuses a record may carry.
    pub allowed_statuses: Vec<EntryStatus>,
}

impl Default for ValidationContext {
    fn default() -> Self {
        ValidationContext {
            today: dates::today(),
            allowed_statuses: DEFAULT_STATUSES.to_vec(),
        }
    }
}

/// Values the shared pipeline extracted from a record.
#[derive(Debug, Default)]
struct CommonFields {
    quantity: Option<f64>,
    status: Option<EntryStatus>,
}

impl ValidationContext {
    /// A context pinned to a given day with the default statuses.
    pub fn on(today: NaiveDate) -> Self {
        ValidationContext {
            today,
            ..Self::default()
        }
    }

    /// Replaces the allowed status set.
    pub fn with_statuses(mut self, allowed: impl Into<Vec<EntryStatus>>) -> Self {
        self.allowed_statuses = allowed.into();
        self
    }

    /// Runs required/date/quantity/status checks shared by every register.
    fn common(
        &self,
        result: &mut ValidationResult,
        required_fields: &[(&str, Option<&FieldValue>)],
        date: Option<&FieldValue>,
        quantity: Option<&FieldValue>,
        status: Option<&FieldValue>,
    ) -> CommonFields {
        for (name, value) in required_fields {
            result.check(required(*value, name));
        }

        if let Some(value) = present(date) {
            result.check(date_on(Some(value), DATE, &DateRules::no_future(), self.today));
        }

        let quantity = present(quantity)
            .and_then(|value| result.check(number(Some(value), QUANTITY, &NumberRules::quantity())));

        let status = present(status)
            .and_then(|value| result.check(status_in(Some(value), STATUS, &self.allowed_statuses)));

        CommonFields { quantity, status }
    }

    // -------------------------------------------------------------------------
    // Material Inward
    // -------------------------------------------------------------------------

    /// Validates a material inward entry against the existing register.
    pub fn validate_material_inward(
        &self,
        record: &MaterialInward,
        existing: &[MaterialInward],
    ) -> ValidationResult {
        let mut result = ValidationResult::new();

        self.common(
            &mut result,
            &[
                (DATE, record.date.as_ref()),
                (PRODUCT_CODE, record.product_code.as_ref()),
                (PRODUCT_NAME, record.product_name.as_ref()),
                (SUPPLIER, record.supplier.as_ref()),
                (QUANTITY, record.quantity.as_ref()),
            ],
            record.date.as_ref(),
            record.quantity.as_ref(),
            record.status.as_ref(),
        );

        if let Some(code) = present(record.product_code.as_ref()) {
            result.check(product_code(Some(code), PRODUCT_CODE));
        }

        if let Some(key) = InwardKey::of(record) {
            if existing.iter().any(|entry| InwardKey::of(entry).as_ref() == Some(&key)) {
                result.add_error(ValidationError::duplicate(
                    PRODUCT_CODE,
                    &format!(
                        "inward of {} from {} on {}",
                        key.product_code, key.supplier, key.date
                    ),
                ));
            }
        }

        result
    }

    // -------------------------------------------------------------------------
    // Material Issue
    // -------------------------------------------------------------------------

    /// Validates a material issue against current raw-material stock.
    ///
    /// ## Stock Rule
    /// ```text
    /// Status     code in stock?   qty > available?   outcome
    /// ─────────  ──────────────   ────────────────   ───────────────────────
    /// Completed  yes              yes                INSUFFICIENT_STOCK
    /// Completed  no               -                  warning: stock unknown
    /// Pending    yes              yes                warning only
    /// (none)     -                -                  no stock check
    /// ```
    pub fn validate_material_issue(
        &self,
        record: &MaterialIssue,
        stock: Option<&StockLevels>,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();

        let common = self.common(
            &mut result,
            &[
                (DATE, record.date.as_ref()),
                (ITEM_CODE, record.item_code.as_ref()),
                (ITEM_NAME, record.item_name.as_ref()),
                (QUANTITY, record.quantity.as_ref()),
                (ISSUED_TO, record.issued_to.as_ref()),
            ],
            record.date.as_ref(),
            record.quantity.as_ref(),
            record.status.as_ref(),
        );

        let (Some(stock), Some(code), Some(requested)) =
            (stock, trimmed(record.item_code.as_ref()), common.quantity)
        else {
            return result;
        };

        match (common.status, stock.get(&code)) {
            (Some(EntryStatus::Completed), Some(available)) if requested > available => {
                result.add_error(ValidationError::insufficient_stock(
                    QUANTITY, &code, available, requested,
                ));
            }
            (Some(EntryStatus::Completed), None) => {
                result.add_warning(ValidationWarning::new(
                    ITEM_CODE,
                    format!("Stock level for {} is unknown; stock was not checked", code),
                ));
            }
            (Some(EntryStatus::Pending), Some(available)) if requested > available => {
                result.add_warning(exceeds_stock_warning(&code, available, requested));
            }
            _ => {}
        }

        result
    }

    // -------------------------------------------------------------------------
    // Finished Goods
    // -------------------------------------------------------------------------

    /// Validates a finished-goods inward entry against the FG stock sheet.
    pub fn validate_fg_inward(
        &self,
        record: &FgMaterialInward,
        fg_stock: &[FgStockEntry],
    ) -> ValidationResult {
        let mut result = ValidationResult::new();

        self.common(
            &mut result,
            &[
                (DATE, record.date.as_ref()),
                (PRODUCT_CODE, record.product_code.as_ref()),
                (PRODUCT_NAME, record.product_name.as_ref()),
                (QUANTITY, record.quantity.as_ref()),
            ],
            record.date.as_ref(),
            record.quantity.as_ref(),
            record.status.as_ref(),
        );

        if let Some(code) = present(record.product_code.as_ref()) {
            if let Some(code) = result.check(product_code(Some(code), PRODUCT_CODE)) {
                if find_fg(fg_stock, &code).is_none() {
                    result.add_error(ValidationError::product_not_found(PRODUCT_CODE, &code));
                }
            }
        }

        result
    }

    /// Validates a finished-goods dispatch against the FG stock sheet.
    pub fn validate_fg_outward(
        &self,
        record: &FgMaterialOutward,
        fg_stock: &[FgStockEntry],
    ) -> ValidationResult {
        let mut result = ValidationResult::new();

        let common = self.common(
            &mut result,
            &[
                (DATE, record.date.as_ref()),
                (PRODUCT_CODE, record.product_code.as_ref()),
                (PRODUCT_NAME, record.product_name.as_ref()),
                (QUANTITY, record.quantity.as_ref()),
                (CUSTOMER, record.customer.as_ref()),
            ],
            record.date.as_ref(),
            record.quantity.as_ref(),
            record.status.as_ref(),
        );

        let Some(code) = trimmed(record.product_code.as_ref()) else {
            return result;
        };

        let Some(entry) = find_fg(fg_stock, &code) else {
            result.add_error(ValidationError::product_not_found(PRODUCT_CODE, &code));
            return result;
        };

        if let Some(requested) = common.quantity {
            let available = entry.current_stock();
            match common.status {
                Some(EntryStatus::Completed) if requested > available => {
                    result.add_error(ValidationError::insufficient_stock(
                        QUANTITY, &code, available, requested,
                    ));
                }
                Some(EntryStatus::Pending) if requested > available => {
                    result.add_warning(exceeds_stock_warning(&code, available, requested));
                }
                _ => {}
            }
        }

        result
    }

    /// Dispatches a tagged record to its register's validator.
    pub fn validate_record(&self, record: &InventoryRecord, data: &ComparisonData<'_>) -> ValidationResult {
        match record {
            InventoryRecord::MaterialInward(r) => self.validate_material_inward(r, data.existing_inward),
            InventoryRecord::MaterialIssue(r) => self.validate_material_issue(r, data.stock_levels),
            InventoryRecord::FgInward(r) => self.validate_fg_inward(r, data.fg_stock),
            InventoryRecord::FgOutward(r) => self.validate_fg_outward(r, data.fg_stock),
        }
    }
}

impl InventoryRecord {
    /// Validates this record with today's date and the default statuses.
    pub fn validate(&self, data: &ComparisonData<'_>) -> ValidationResult {
        ValidationContext::default().validate_record(self, data)
    }
}

// =============================================================================
// Free-Function Entry Points
// =============================================================================

/// [`ValidationContext::validate_material_inward`] on today's date.
pub fn validate_material_inward(record: &MaterialInward, existing: &[MaterialInward]) -> ValidationResult {
    ValidationContext::default().validate_material_inward(record, existing)
}

/// [`ValidationContext::validate_material_issue`] on today's date.
pub fn validate_material_issue(record: &MaterialIssue, stock: Option<&StockLevels>) -> ValidationResult {
    ValidationContext::default().validate_material_issue(record, stock)
}

/// [`ValidationContext::validate_fg_inward`] on today's date.
pub fn validate_fg_material_inward(record: &FgMaterialInward, fg_stock: &[FgStockEntry]) -> ValidationResult {
    ValidationContext::default().validate_fg_inward(record, fg_stock)
}

/// [`ValidationContext::validate_fg_outward`] on today's date.
pub fn validate_fg_material_outward(record: &FgMaterialOutward, fg_stock: &[FgStockEntry]) -> ValidationResult {
    ValidationContext::default().validate_fg_outward(record, fg_stock)
}

// =============================================================================
// Helpers
// =============================================================================

/// The value if it is present and not blank.
fn present(value: Option<&FieldValue>) -> Option<&FieldValue> {
    value.filter(|v| !v.is_blank())
}

/// The value as trimmed text, if present and not blank.
fn trimmed(value: Option<&FieldValue>) -> Option<String> {
    present(value).map(|v| v.to_text().trim().to_string())
}

fn find_fg<'a>(fg_stock: &'a [FgStockEntry], code: &str) -> Option<&'a FgStockEntry> {
    fg_stock.iter().find(|entry| entry.product_code.trim() == code)
}

fn exceeds_stock_warning(code: &str, available: f64, requested: f64) -> ValidationWarning {
    ValidationWarning::new(
        QUANTITY,
        format!(
            "Requested {} of {} exceeds current stock of {}; stock must be available before completion",
            requested, code, available
        ),
    )
}

/// Identity of an inward entry for duplicate detection.
#[derive(Debug, PartialEq, Eq)]
struct InwardKey {
    date: String,
    product_code: String,
    supplier: String,
}

impl InwardKey {
    /// Builds the key when all three parts are present. Dates compare in
    /// normalized form so `01/15/2024` matches `2024-01-15`.
    fn of(record: &MaterialInward) -> Option<Self> {
        let raw_date = trimmed(record.date.as_ref())?;
        let date = parse_date(&raw_date).map(format_date).unwrap_or(raw_date);
        Some(InwardKey {
            date,
            product_code: trimmed(record.product_code.as_ref())?,
            supplier: trimmed(record.supplier.as_ref())?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::field;

    fn ctx() -> ValidationContext {
        ValidationContext::on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn inward() -> MaterialInward {
        MaterialInward {
            date: field("2024-01-15"),
            product_code: field("RM-001"),
            product_name: field("Steel Rod"),
            supplier: field("Acme Metals"),
            quantity: field(50.0),
            ..Default::default()
        }
    }

    fn issue(status: &str, quantity: f64) -> MaterialIssue {
        MaterialIssue {
            date: field("2024-01-15"),
            item_code: field("RM-001"),
            item_name: field("Steel Rod"),
            quantity: field(quantity),
            issued_to: field("Assembly"),
            status: field(status),
            ..Default::default()
        }
    }

    fn fg_stock() -> Vec<FgStockEntry> {
        vec![
            FgStockEntry::new("FG-001", "Widget", 40.0),
            FgStockEntry::new("FG-002", "Gadget", 0.0),
        ]
    }

    fn outward(code: &str, status: &str, quantity: f64) -> FgMaterialOutward {
        FgMaterialOutward {
            date: field("2024-01-15"),
            product_code: field(code),
            product_name: field("Widget"),
            quantity: field(quantity),
            customer: field("Globex"),
            status: field(status),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_material_inward() {
        let result = ctx().validate_material_inward(&inward(), &[]);
        assert!(result.is_valid(), "{:?}", result.errors());
    }

    #[test]
    fn test_material_inward_missing_fields_reported_once() {
        let record = MaterialInward {
            supplier: field("   "),
            ..inward()
        };
        let record = MaterialInward { date: None, ..record };
        let result = ctx().validate_material_inward(&record, &[]);

        assert!(!result.is_valid());
        assert_eq!(result.errors_for(DATE).count(), 1);
        assert_eq!(result.errors_for(SUPPLIER).count(), 1);
        assert!(result.errors().iter().all(|e| e.kind() == ErrorKind::RequiredField));
    }

    #[test]
    fn test_material_inward_rules() {
        let record = MaterialInward {
            date: field("2099-01-01"),
            product_code: field("RM 001"),
            quantity: field(0.0),
            status: field("Shipped"),
            ..inward()
        };
        let result = ctx().validate_material_inward(&record, &[]);
        assert_eq!(
            result.error_kinds(),
            vec![
                ErrorKind::FutureDate,
                ErrorKind::InvalidNumber,
                ErrorKind::InvalidStatus,
                ErrorKind::ProductNotFound,
            ]
        );
    }

    #[test]
    fn test_material_inward_duplicate() {
        let existing = vec![MaterialInward {
            date: field("01/15/2024"),
            product_code: field(" RM-001 "),
            quantity: field(10.0),
            ..inward()
        }];
        let result = ctx().validate_material_inward(&inward(), &existing);
        assert_eq!(result.error_kinds(), vec![ErrorKind::DuplicateEntry]);

        let other_supplier = MaterialInward {
            supplier: field("Other Co"),
            ..inward()
        };
        assert!(ctx().validate_material_inward(&other_supplier, &existing).is_valid());
    }

    #[test]
    fn test_issue_stock_check_is_status_gated() {
        let stock: StockLevels = [("RM-001", 100.0)].into_iter().collect();

        let pending = ctx().validate_material_issue(&issue("Pending", 150.0), Some(&stock));
        assert!(pending.is_valid());
        assert!(!pending.has_error_kind(ErrorKind::InsufficientStock));
        assert_eq!(pending.warnings().len(), 1);

        let completed = ctx().validate_material_issue(&issue("Completed", 150.0), Some(&stock));
        assert!(!completed.is_valid());
        assert_eq!(completed.error_kinds(), vec![ErrorKind::InsufficientStock]);

        let within = ctx().validate_material_issue(&issue("Completed", 100.0), Some(&stock));
        assert!(within.is_valid());
    }

    #[test]
    fn test_issue_unknown_item_warns() {
        let stock: StockLevels = [("RM-999", 5.0)].into_iter().collect();
        let result = ctx().validate_material_issue(&issue("Completed", 10.0), Some(&stock));
        assert!(result.is_valid());
        assert_eq!(result.warnings()[0].field(), ITEM_CODE);
    }

    #[test]
    fn test_issue_without_stock_snapshot() {
        let result = ctx().validate_material_issue(&issue("Completed", 1_000.0), None);
        assert!(result.is_valid());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_issue_required_fields() {
        let record = MaterialIssue {
            issued_to: None,
            item_name: field(""),
            ..issue("Pending", 1.0)
        };
        let result = ctx().validate_material_issue(&record, None);
        assert_eq!(result.errors_for(ISSUED_TO).count(), 1);
        assert_eq!(result.errors_for(ITEM_NAME).count(), 1);
    }

    #[test]
    fn test_fg_inward_product_lookup() {
        let record = FgMaterialInward {
            date: field("2024-01-15"),
            product_code: field("FG-404"),
            product_name: field("Unknown"),
            quantity: field(5.0),
            ..Default::default()
        };
        let result = ctx().validate_fg_inward(&record, &fg_stock());
        assert_eq!(result.error_kinds(), vec![ErrorKind::ProductNotFound]);

        let known = FgMaterialInward {
            product_code: field("FG-001"),
            ..record
        };
        assert!(ctx().validate_fg_inward(&known, &fg_stock()).is_valid());
    }

    #[test]
    fn test_fg_outward_missing_product_regardless_of_other_fields() {
        let record = FgMaterialOutward {
            customer: None,
            quantity: field("lots"),
            ..outward("FG-404", "Completed", 1.0)
        };
        let result = ctx().validate_fg_outward(&record, &fg_stock());
        assert!(result.has_error_kind(ErrorKind::ProductNotFound));
    }

    #[test]
    fn test_fg_outward_stock() {
        let completed = ctx().validate_fg_outward(&outward("FG-001", "Completed", 41.0), &fg_stock());
        assert_eq!(completed.error_kinds(), vec![ErrorKind::InsufficientStock]);

        let pending = ctx().validate_fg_outward(&outward("FG-001", "Pending", 41.0), &fg_stock());
        assert!(pending.is_valid());
        assert!(pending.has_warnings());

        let cancelled = ctx().validate_fg_outward(&outward("FG-002", "Cancelled", 3.0), &fg_stock());
        assert!(cancelled.is_valid());
    }

    #[test]
    fn test_custom_status_set() {
        let strict = ctx().with_statuses(vec![EntryStatus::Completed]);
        let result = strict.validate_material_issue(&issue("Pending", 1.0), None);
        assert_eq!(result.error_kinds(), vec![ErrorKind::InvalidStatus]);
    }

    #[test]
    fn test_validate_record_dispatch() {
        let stock: StockLevels = [("RM-001", 100.0)].into_iter().collect();
        let data = ComparisonData {
            stock_levels: Some(&stock),
            ..Default::default()
        };
        let record = InventoryRecord::MaterialIssue(issue("Completed", 150.0));
        let result = ctx().validate_record(&record, &data);
        assert!(result.has_error_kind(ErrorKind::InsufficientStock));
    }
}
