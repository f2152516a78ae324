//! # Data Generators
//!
//! Valid records for each register, with override hooks, and the
//! comparison datasets they are checked against.
//!
//! Every call builds a fresh value. Invoice and batch numbers are unique
//! per call, so two generated inward entries never collide by accident.
//!
//! ## Usage
//! ```rust
//! use stockwise_core::types::field;
//! use stockwise_testkit::generators::{material_issue_with, stock_levels};
//!
//! let issue = material_issue_with(|r| r.quantity = field(500.0));
//! assert!(stock_levels().get("RM-001").is_some());
//! # let _ = issue;
//! ```

use chrono::Days;
use stockwise_core::dates::{format_date, today};
use stockwise_core::types::{
    field, FgMaterialInward, FgMaterialOutward, FgStockEntry, FieldValue, MaterialInward,
    MaterialIssue, StockLevels,
};
use uuid::Uuid;

/// Yesterday as `YYYY-MM-DD`: always a valid, non-future entry date.
pub fn entry_date() -> String {
    let day = today();
    format_date(day.checked_sub_days(Days::new(1)).unwrap_or(day))
}

fn unique_ref(prefix: &str) -> Option<FieldValue> {
    let id = Uuid::new_v4().simple().to_string();
    field(format!("{}-{}", prefix, &id[..8]))
}

// =============================================================================
// Records
// =============================================================================

pub fn material_inward() -> MaterialInward {
    MaterialInward {
        date: field(entry_date()),
        product_code: field("RM-001"),
        product_name: field("Steel Rod 12mm"),
        supplier: field("Acme Metals"),
        quantity: field(50.0),
        unit: field("kg"),
        invoice_no: unique_ref("INV"),
        status: field("Completed"),
        remarks: None,
        extra: Default::default(),
    }
}

pub fn material_inward_with(overrides: impl FnOnce(&mut MaterialInward)) -> MaterialInward {
    let mut record = material_inward();
    overrides(&mut record);
    record
}

pub fn material_issue() -> MaterialIssue {
    MaterialIssue {
        date: field(entry_date()),
        item_code: field("RM-001"),
        item_name: field("Steel Rod 12mm"),
        quantity: field(10.0),
        issued_to: field("Assembly Line 2"),
        department: field("Production"),
        purpose: field("Frame welding"),
        status: field("Completed"),
        extra: Default::default(),
    }
}

pub fn material_issue_with(overrides: impl FnOnce(&mut MaterialIssue)) -> MaterialIssue {
    let mut record = material_issue();
    overrides(&mut record);
    record
}

pub fn fg_inward() -> FgMaterialInward {
    FgMaterialInward {
        date: field(entry_date()),
        product_code: field("FG-001"),
        product_name: field("Widget A"),
        quantity: field(20.0),
        batch_no: unique_ref("BATCH"),
        status: field("Completed"),
        remarks: None,
        extra: Default::default(),
    }
}

pub fn fg_inward_with(overrides: impl FnOnce(&mut FgMaterialInward)) -> FgMaterialInward {
    let mut record = fg_inward();
    overrides(&mut record);
    record
}

pub fn fg_outward() -> FgMaterialOutward {
    FgMaterialOutward {
        date: field(entry_date()),
        product_code: field("FG-001"),
        product_name: field("Widget A"),
        quantity: field(5.0),
        customer: field("Globex Corp"),
        invoice_no: unique_ref("INV"),
        status: field("Completed"),
        extra: Default::default(),
    }
}

pub fn fg_outward_with(overrides: impl FnOnce(&mut FgMaterialOutward)) -> FgMaterialOutward {
    let mut record = fg_outward();
    overrides(&mut record);
    record
}

// =============================================================================
// Comparison Datasets
// =============================================================================

/// Raw material stock: RM-001 = 100, RM-002 = 50, RM-003 = 0.
pub fn stock_levels() -> StockLevels {
    [("RM-001", 100.0), ("RM-002", 50.0), ("RM-003", 0.0)]
        .into_iter()
        .collect()
}

/// FG stock sheet rows. FG-003 carries its stock as text, the way a sheet
/// export sometimes does.
pub fn fg_stock_snapshot() -> Vec<FgStockEntry> {
    vec![
        FgStockEntry::new("FG-001", "Widget A", 40.0),
        FgStockEntry::new("FG-002", "Widget B", 0.0),
        FgStockEntry {
            product_code: "FG-003".to_string(),
            product_name: Some("Gadget".to_string()),
            current_stock: field("12"),
        },
    ]
}

/// `count` distinct existing inward entries, for duplicate checks and paging.
pub fn existing_inward(count: usize) -> Vec<MaterialInward> {
    (0..count)
        .map(|i| {
            material_inward_with(|r| {
                r.product_code = field(format!("RM-{:03}", i + 100));
                r.quantity = field((i % 50 + 1) as f64);
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockwise_core::inventory::{
        validate_fg_material_inward, validate_fg_material_outward, validate_material_inward,
        validate_material_issue,
    };

    #[test]
    fn test_generated_records_are_valid() {
        assert!(validate_material_inward(&material_inward(), &[]).is_valid());
        assert!(validate_material_issue(&material_issue(), Some(&stock_levels())).is_valid());
        assert!(validate_fg_material_inward(&fg_inward(), &fg_stock_snapshot()).is_valid());
        assert!(validate_fg_material_outward(&fg_outward(), &fg_stock_snapshot()).is_valid());
    }

    #[test]
    fn test_invoice_numbers_are_unique() {
        assert_ne!(material_inward().invoice_no, material_inward().invoice_no);
    }

    #[test]
    fn test_overrides_apply() {
        let record = fg_outward_with(|r| r.customer = None);
        assert_eq!(record.customer, None);
        assert_eq!(record.product_code, field("FG-001"));
    }

    #[test]
    fn test_existing_inward_is_distinct() {
        let rows = existing_inward(3);
        assert_eq!(rows.len(), 3);
        assert_ne!(rows[0].product_code, rows[1].product_code);
        assert!(validate_material_inward(&material_inward(), &rows).is_valid());
    }

    #[test]
    fn test_text_stock_is_read() {
        assert_eq!(fg_stock_snapshot()[2].current_stock(), 12.0);
    }
}
