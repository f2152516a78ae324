//! Cross-crate checks: the full suite, and records flowing from JSON
//! through the handler.

use stockwise_core::types::{ComparisonData, InventoryRecord};
use stockwise_core::ValidationContext;
use stockwise_runtime::{InventoryErrorHandler, SnackbarKind};
use stockwise_testkit::generators::{fg_stock_snapshot, material_inward, stock_levels};
use stockwise_testkit::{run_all_tests, run_test_category, TestCategory};

#[tokio::test]
async fn full_suite_totals_add_up() {
    let summary = run_all_tests().await;

    assert_eq!(summary.passed + summary.failed, summary.total);

    let mut category_total = 0;
    for category in TestCategory::ALL {
        category_total += run_test_category(category).await.total;
    }
    assert_eq!(summary.total, category_total);

    let failures: Vec<_> = summary.failures().collect();
    assert!(failures.is_empty(), "{:?}", failures);
}

#[tokio::test]
async fn categories_run_in_any_order() {
    let forward = run_test_category(TestCategory::EdgeCases).await;
    let _ = run_test_category(TestCategory::Orchestration).await;
    let again = run_test_category(TestCategory::EdgeCases).await;

    assert_eq!(forward.total, again.total);
    assert_eq!(forward.passed, again.passed);
}

#[test]
fn json_record_through_handler() {
    let json = r#"{
        "kind": "fg_outward",
        "Date": "2024-01-15",
        "Product Code": "FG-001",
        "Product Name": "Widget A",
        "Quantity": "41",
        "Customer": "Globex Corp",
        "Status": "Completed",
        "Sheet Row": 12
    }"#;
    let record: InventoryRecord = serde_json::from_str(json).unwrap();

    let fg_stock = fg_stock_snapshot();
    let stock = stock_levels();
    let existing = vec![material_inward()];
    let data = ComparisonData {
        existing_inward: &existing,
        stock_levels: Some(&stock),
        fg_stock: &fg_stock,
    };

    let handler = InventoryErrorHandler::new();
    let passed = handler.validate_record(&ValidationContext::default(), &record, &data);

    assert!(!passed);
    let snackbar = handler.create_snackbar_message(SnackbarKind::Error).unwrap();
    assert_eq!(
        snackbar.message,
        "Insufficient stock for FG-001: available 40, requested 41"
    );
}
