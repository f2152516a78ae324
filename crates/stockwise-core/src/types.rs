//! # Domain Types
//!
//! Records under validation and the comparison datasets they are checked
//! against.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Records (form-shaped, raw input)       Comparison datasets (read-only) │
//! │  ────────────────────────────────       ─────────────────────────────── │
//! │  MaterialInward    ──── duplicates ───► &[MaterialInward]               │
//! │  MaterialIssue     ──── stock check ──► StockLevels (code → qty)        │
//! │  FgMaterialInward  ──── lookup ───────► &[FgStockEntry]                 │
//! │  FgMaterialOutward ──── lookup+stock ─► &[FgStockEntry]                 │
//! │                                                                         │
//! │  InventoryRecord = tagged union of the four record shapes               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Raw Values
//! Every record field is an `Option<FieldValue>`: the forms send strings,
//! numbers, or booleans, and `0` / `false` are present values. Absence is
//! `None`; a blank string is present but fails `required`.
//!
//! Field names serialize as the sheet column headers (`"Product Code"`,
//! `"Issued To"`, ...). Unknown columns are kept in `extra` and ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::edge_cases::handle_numeric_edge_cases;

// =============================================================================
// Field Value
// =============================================================================

/// A raw form value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// True for an all-whitespace string. Numbers and booleans are never blank.
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }

    /// Parses the value as a finite float.
    ///
    /// Strings are trimmed and must parse in full; booleans are not numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Number(_) => None,
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            FieldValue::Bool(_) => None,
        }
    }

    /// The value rendered as text (numbers without a trailing `.0`).
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// Shorthand for building record fields: `field("RM-001")`, `field(150.0)`.
pub fn field(value: impl Into<FieldValue>) -> Option<FieldValue> {
    Some(value.into())
}

// =============================================================================
// Entry Status
// =============================================================================

/// Lifecycle status of an inventory entry.
///
/// Only `Completed` consumes stock; `Pending` is reserved demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    Completed,
    Cancelled,
}

/// The statuses accepted when no explicit set is configured.
pub const DEFAULT_STATUSES: [EntryStatus; 3] = [
    EntryStatus::Pending,
    EntryStatus::Completed,
    EntryStatus::Cancelled,
];

impl EntryStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "Pending",
            EntryStatus::Completed => "Completed",
            EntryStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string outside the known spellings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown status: '{0}'. Valid options: Pending, Completed, Cancelled")]
pub struct UnknownStatus(pub String);

/// Exact, case-sensitive match on the sheet spelling.
impl std::str::FromStr for EntryStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(EntryStatus::Pending),
            "Completed" => Ok(EntryStatus::Completed),
            "Cancelled" => Ok(EntryStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// Raw material received from a supplier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialInward {
    #[serde(rename = "Date", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<FieldValue>,
    #[serde(rename = "Product Code", default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<FieldValue>,
    #[serde(rename = "Product Name", default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<FieldValue>,
    #[serde(rename = "Supplier", default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<FieldValue>,
    #[serde(rename = "Quantity", default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<FieldValue>,
    #[serde(rename = "Unit", default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<FieldValue>,
    #[serde(rename = "Invoice No", default, skip_serializing_if = "Option::is_none")]
    pub invoice_no: Option<FieldValue>,
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FieldValue>,
    #[serde(rename = "Remarks", default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<FieldValue>,
    /// Columns this record type does not know about.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Raw material issued out of the store to a person or department.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialIssue {
    #[serde(rename = "Date", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<FieldValue>,
    #[serde(rename = "itemCode", default, skip_serializing_if = "Option::is_none")]
    pub item_code: Option<FieldValue>,
    #[serde(rename = "itemName", default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<FieldValue>,
    #[serde(rename = "Quantity", default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<FieldValue>,
    #[serde(rename = "Issued To", default, skip_serializing_if = "Option::is_none")]
    pub issued_to: Option<FieldValue>,
    #[serde(rename = "Department", default, skip_serializing_if = "Option::is_none")]
    pub department: Option<FieldValue>,
    #[serde(rename = "Purpose", default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<FieldValue>,
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FieldValue>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Finished goods received into the FG store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FgMaterialInward {
    #[serde(rename = "Date", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<FieldValue>,
    #[serde(rename = "Product Code", default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<FieldValue>,
    #[serde(rename = "Product Name", default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<FieldValue>,
    #[serde(rename = "Quantity", default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<FieldValue>,
    #[serde(rename = "Batch No", default, skip_serializing_if = "Option::is_none")]
    pub batch_no: Option<FieldValue>,
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FieldValue>,
    #[serde(rename = "Remarks", default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<FieldValue>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Finished goods dispatched to a customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FgMaterialOutward {
    #[serde(rename = "Date", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<FieldValue>,
    #[serde(rename = "Product Code", default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<FieldValue>,
    #[serde(rename = "Product Name", default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<FieldValue>,
    #[serde(rename = "Quantity", default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<FieldValue>,
    #[serde(rename = "Customer", default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<FieldValue>,
    #[serde(rename = "Invoice No", default, skip_serializing_if = "Option::is_none")]
    pub invoice_no: Option<FieldValue>,
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FieldValue>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One of the four record shapes, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InventoryRecord {
    MaterialInward(MaterialInward),
    MaterialIssue(MaterialIssue),
    FgInward(FgMaterialInward),
    FgOutward(FgMaterialOutward),
}

// =============================================================================
// Comparison Datasets
// =============================================================================

/// Current stock per item code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockLevels(BTreeMap<String, f64>);

impl StockLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, quantity: f64) {
        self.0.insert(code.into(), quantity);
    }

    /// Available quantity for a code, if the code is tracked.
    pub fn get(&self, code: &str) -> Option<f64> {
        self.0.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for StockLevels {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        StockLevels(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// One row of the finished-goods stock sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FgStockEntry {
    #[serde(rename = "Product Code")]
    pub product_code: String,
    #[serde(rename = "Product Name", default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(rename = "Current Stock", default, skip_serializing_if = "Option::is_none")]
    pub current_stock: Option<FieldValue>,
}

impl FgStockEntry {
    pub fn new(code: impl Into<String>, name: impl Into<String>, current_stock: f64) -> Self {
        FgStockEntry {
            product_code: code.into(),
            product_name: Some(name.into()),
            current_stock: Some(FieldValue::Number(current_stock)),
        }
    }

    /// Current stock, with a missing or unreadable cell counted as zero.
    pub fn current_stock(&self) -> f64 {
        handle_numeric_edge_cases(self.current_stock.as_ref(), 0.0)
    }
}

/// Everything a validator may compare a record against.
///
/// Borrowed snapshots: the validators read them once per call and never
/// keep them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonData<'a> {
    /// Existing material inward entries (duplicate detection).
    pub existing_inward: &'a [MaterialInward],
    /// Raw material stock (issue stock checks).
    pub stock_levels: Option<&'a StockLevels>,
    /// Finished goods stock sheet.
    pub fg_stock: &'a [FgStockEntry],
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_blank() {
        assert!(FieldValue::from("   ").is_blank());
        assert!(FieldValue::from("").is_blank());
        assert!(!FieldValue::from(0.0).is_blank());
        assert!(!FieldValue::from(false).is_blank());
    }

    #[test]
    fn test_field_value_as_number() {
        assert_eq!(FieldValue::from(" 12.5 ").as_number(), Some(12.5));
        assert_eq!(FieldValue::from(3_i64).as_number(), Some(3.0));
        assert_eq!(FieldValue::from("abc").as_number(), None);
        assert_eq!(FieldValue::from("inf").as_number(), None);
        assert_eq!(FieldValue::from(true).as_number(), None);
    }

    #[test]
    fn test_field_value_to_text() {
        assert_eq!(FieldValue::from(150.0).to_text(), "150");
        assert_eq!(FieldValue::from(0.5).to_text(), "0.5");
    }

    #[test]
    fn test_entry_status_parsing() {
        assert_eq!("Completed".parse::<EntryStatus>().unwrap(), EntryStatus::Completed);
        assert!("completed".parse::<EntryStatus>().is_err());
        assert!("Shipped".parse::<EntryStatus>().is_err());
    }

    #[test]
    fn test_record_deserializes_sheet_columns() {
        let json = r#"{
            "Date": "2024-01-15",
            "Product Code": "RM-001",
            "Product Name": "Steel Rod",
            "Supplier": "Acme",
            "Quantity": 150,
            "Row Id": 7
        }"#;
        let record: MaterialInward = serde_json::from_str(json).unwrap();
        assert_eq!(record.product_code, field("RM-001"));
        assert_eq!(record.quantity, Some(FieldValue::Number(150.0)));
        assert_eq!(record.status, None);
        assert!(record.extra.contains_key("Row Id"));
    }

    #[test]
    fn test_tagged_record_roundtrip() {
        let record = InventoryRecord::MaterialIssue(MaterialIssue {
            item_code: field("RM-001"),
            quantity: field(5.0),
            ..Default::default()
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "material_issue");
        assert_eq!(json["itemCode"], "RM-001");
    }

    #[test]
    fn test_fg_stock_entry_current_stock() {
        let entry = FgStockEntry {
            product_code: "FG-001".into(),
            product_name: None,
            current_stock: field("42"),
        };
        assert_eq!(entry.current_stock(), 42.0);

        let blank = FgStockEntry {
            product_code: "FG-002".into(),
            ..Default::default()
        };
        assert_eq!(blank.current_stock(), 0.0);
    }

    #[test]
    fn test_stock_levels_from_iter() {
        let stock: StockLevels = [("RM-001", 100.0), ("RM-002", 5.0)].into_iter().collect();
        assert_eq!(stock.get("RM-001"), Some(100.0));
        assert_eq!(stock.get("RM-404"), None);
        assert_eq!(stock.len(), 2);
    }
}
