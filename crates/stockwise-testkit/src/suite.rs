//! # Self-Test Suite
//!
//! Assertion functions over every validator, normalizer, and handler,
//! grouped into categories.
//!
//! ## Shape
//! ```text
//! TestCase     { testName, expected, actual, passed }
//! TestSummary  { total, passed, failed, tests }
//!
//! run_all_tests()           every category, in TestCategory::ALL order
//! run_test_category(cat)    one category
//! ```
//!
//! Each check builds its own inputs and its own handler, so categories can
//! run in any order without affecting each other. Retrying checks use a
//! millisecond policy instead of the production 1s/2s schedule.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;
use serde_json::Value;
use stockwise_core::dates::{format_date, today};
use stockwise_core::edge_cases::{
    handle_date_edge_cases, handle_empty_data, handle_large_dataset, handle_numeric_edge_cases,
};
use stockwise_core::inventory::{
    validate_fg_material_inward, validate_fg_material_outward, validate_material_inward,
    validate_material_issue,
};
use stockwise_core::types::{field, ComparisonData, FieldValue, InventoryRecord};
use stockwise_core::validation::{
    date, number, product_code, required, status, DateRules, NumberRules,
};
use stockwise_core::{ErrorKind, ServiceError, ValidationResult};
use stockwise_runtime::{
    handle_api_error, handle_concurrent_stock_update, handle_sheet_error, retry,
    InventoryErrorHandler, RetryPolicy, SnackbarKind, GENERAL_FIELD, STOCK_FIELD,
};
use thiserror::Error;
use tracing::info;

use crate::generators::{
    existing_inward, fg_inward_with, fg_outward_with, fg_stock_snapshot, material_inward,
    material_inward_with, material_issue_with, stock_levels,
};

// =============================================================================
// Test Case & Summary
// =============================================================================

/// One named check: `{ testName, expected, actual, passed }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub test_name: String,
    pub expected: Value,
    pub actual: Value,
    pub passed: bool,
}

impl TestCase {
    /// Compares `expected` and `actual` by their JSON form.
    pub fn check(name: impl Into<String>, expected: impl Serialize, actual: impl Serialize) -> Self {
        let expected = to_json(expected);
        let actual = to_json(actual);
        TestCase {
            test_name: name.into(),
            passed: expected == actual,
            expected,
            actual,
        }
    }
}

fn to_json(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| Value::String(format!("<unserializable: {}>", e)))
}

/// Tally over a set of checks: `{ total, passed, failed, tests }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub tests: Vec<TestCase>,
}

impl TestSummary {
    pub fn from_tests(tests: Vec<TestCase>) -> Self {
        let passed = tests.iter().filter(|t| t.passed).count();
        TestSummary {
            total: tests.len(),
            passed,
            failed: tests.len() - passed,
            tests,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestCase> {
        self.tests.iter().filter(|t| !t.passed)
    }
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestCategory {
    FieldValidators,
    EntityValidators,
    EdgeCases,
    ErrorHandlers,
    Orchestration,
}

impl TestCategory {
    pub const ALL: [TestCategory; 5] = [
        TestCategory::FieldValidators,
        TestCategory::EntityValidators,
        TestCategory::EdgeCases,
        TestCategory::ErrorHandlers,
        TestCategory::Orchestration,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            TestCategory::FieldValidators => "field-validators",
            TestCategory::EntityValidators => "entity-validators",
            TestCategory::EdgeCases => "edge-cases",
            TestCategory::ErrorHandlers => "error-handlers",
            TestCategory::Orchestration => "orchestration",
        }
    }
}

impl fmt::Display for TestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown test category: '{0}'. Valid options: field-validators, entity-validators, edge-cases, error-handlers, orchestration")]
pub struct UnknownCategory(pub String);

/// Case-insensitive; `_` and `-` are interchangeable.
impl FromStr for TestCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        TestCategory::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// =============================================================================
// Runners
// =============================================================================

/// Runs every category and aggregates the results.
pub async fn run_all_tests() -> TestSummary {
    let mut tests = Vec::new();
    for category in TestCategory::ALL {
        tests.extend(run_test_category(category).await.tests);
    }
    let summary = TestSummary::from_tests(tests);
    info!(
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        "Self-test finished"
    );
    summary
}

/// Runs one category.
pub async fn run_test_category(category: TestCategory) -> TestSummary {
    let tests = match category {
        TestCategory::FieldValidators => field_validator_tests(),
        TestCategory::EntityValidators => entity_validator_tests(),
        TestCategory::EdgeCases => edge_case_tests(),
        TestCategory::ErrorHandlers => error_handler_tests().await,
        TestCategory::Orchestration => orchestration_tests().await,
    };
    let summary = TestSummary::from_tests(tests);
    info!(
        category = %category,
        total = summary.total,
        failed = summary.failed,
        "Category finished"
    );
    summary
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        multiplier: 2.0,
    }
}

fn first_kind<T>(result: &Result<T, stockwise_core::ValidationError>) -> Option<ErrorKind> {
    result.as_ref().err().map(|e| e.kind())
}

fn kinds(result: &ValidationResult) -> Vec<ErrorKind> {
    result.error_kinds()
}

// =============================================================================
// Field Validators
// =============================================================================

fn text(value: &str) -> FieldValue {
    FieldValue::from(value)
}

fn field_validator_tests() -> Vec<TestCase> {
    let quantity = NumberRules::quantity();

    vec![
        TestCase::check(
            "required accepts zero",
            true,
            required(Some(&FieldValue::from(0.0)), "Quantity").is_ok(),
        ),
        TestCase::check(
            "required accepts false",
            true,
            required(Some(&FieldValue::from(false)), "Flag").is_ok(),
        ),
        TestCase::check(
            "required rejects whitespace",
            Some(ErrorKind::RequiredField),
            first_kind(&required(Some(&text("   ")), "Supplier")),
        ),
        TestCase::check(
            "required rejects missing",
            Some(ErrorKind::RequiredField),
            first_kind(&required(None, "Supplier")),
        ),
        TestCase::check(
            "number parses text",
            Some(12.5),
            number(Some(&text("12.5")), "Quantity", &NumberRules::default()).ok(),
        ),
        TestCase::check(
            "number rejects text",
            Some(ErrorKind::InvalidNumber),
            first_kind(&number(Some(&text("twelve")), "Quantity", &quantity)),
        ),
        TestCase::check(
            "number rejects negative",
            Some(ErrorKind::NegativeNumber),
            first_kind(&number(Some(&FieldValue::from(-3.0)), "Quantity", &quantity)),
        ),
        TestCase::check(
            "quantity rejects zero",
            Some(ErrorKind::InvalidNumber),
            first_kind(&number(Some(&FieldValue::from(0.0)), "Quantity", &quantity)),
        ),
        TestCase::check(
            "date rejects far future",
            Some(ErrorKind::FutureDate),
            first_kind(&date(Some(&text("9999-01-01")), "Date", &DateRules::no_future())),
        ),
        TestCase::check(
            "date accepts today",
            true,
            date(Some(&text(&format_date(today()))), "Date", &DateRules::no_future()).is_ok(),
        ),
        TestCase::check(
            "date normalizes month/day/year",
            Some("2024-01-15"),
            date(Some(&text("01/15/2024")), "Date", &DateRules::default()).ok(),
        ),
        TestCase::check(
            "status rejects unknown",
            Some(ErrorKind::InvalidStatus),
            first_kind(&status(Some(&text("Shipped")), "Status")),
        ),
        TestCase::check(
            "status is case sensitive",
            Some(ErrorKind::InvalidStatus),
            first_kind(&status(Some(&text("completed")), "Status")),
        ),
        TestCase::check(
            "product code is trimmed",
            Some("RM-001"),
            product_code(Some(&text(" RM-001 ")), "Product Code").ok(),
        ),
        TestCase::check(
            "product code rejects spaces",
            true,
            product_code(Some(&text("RM 001")), "Product Code").is_err(),
        ),
    ]
}

// =============================================================================
// Entity Validators
// =============================================================================

fn entity_validator_tests() -> Vec<TestCase> {
    let stock = stock_levels();
    let fg_stock = fg_stock_snapshot();

    let inward = material_inward();
    let duplicate_of = vec![material_inward_with(|r| r.quantity = field(1.0))];

    let pending_over = material_issue_with(|r| {
        r.status = field("Pending");
        r.quantity = field(150.0);
    });
    let completed_over = material_issue_with(|r| {
        r.status = field("Completed");
        r.quantity = field(150.0);
    });
    let unknown_item = material_issue_with(|r| r.item_code = field("RM-999"));

    let missing_fg = fg_outward_with(|r| {
        r.product_code = field("FG-404");
        r.customer = None;
    });
    let fg_over = fg_outward_with(|r| r.quantity = field(41.0));
    let fg_text_stock = fg_outward_with(|r| {
        r.product_code = field("FG-003");
        r.quantity = field(12.0);
    });

    let issue_record = InventoryRecord::MaterialIssue(completed_over.clone());
    let data = ComparisonData {
        stock_levels: Some(&stock),
        ..Default::default()
    };

    vec![
        TestCase::check(
            "material inward valid",
            true,
            validate_material_inward(&inward, &existing_inward(20)).is_valid(),
        ),
        TestCase::check(
            "material inward missing supplier",
            vec![ErrorKind::RequiredField],
            kinds(&validate_material_inward(
                &material_inward_with(|r| r.supplier = field(" ")),
                &[],
            )),
        ),
        TestCase::check(
            "material inward duplicate",
            vec![ErrorKind::DuplicateEntry],
            kinds(&validate_material_inward(&inward, &duplicate_of)),
        ),
        TestCase::check(
            "pending issue over stock is valid",
            true,
            validate_material_issue(&pending_over, Some(&stock)).is_valid(),
        ),
        TestCase::check(
            "pending issue over stock warns",
            true,
            validate_material_issue(&pending_over, Some(&stock)).has_warnings(),
        ),
        TestCase::check(
            "completed issue over stock fails",
            vec![ErrorKind::InsufficientStock],
            kinds(&validate_material_issue(&completed_over, Some(&stock))),
        ),
        TestCase::check(
            "completed issue of unknown item warns",
            (true, true),
            {
                let result = validate_material_issue(&unknown_item, Some(&stock));
                (result.is_valid(), result.has_warnings())
            },
        ),
        TestCase::check(
            "fg inward known product",
            true,
            validate_fg_material_inward(&fg_inward_with(|_| {}), &fg_stock).is_valid(),
        ),
        TestCase::check(
            "fg inward unknown product",
            vec![ErrorKind::ProductNotFound],
            kinds(&validate_fg_material_inward(
                &fg_inward_with(|r| r.product_code = field("FG-404")),
                &fg_stock,
            )),
        ),
        TestCase::check(
            "fg outward unknown product",
            true,
            validate_fg_material_outward(&missing_fg, &fg_stock)
                .has_error_kind(ErrorKind::ProductNotFound),
        ),
        TestCase::check(
            "fg outward over stock",
            vec![ErrorKind::InsufficientStock],
            kinds(&validate_fg_material_outward(&fg_over, &fg_stock)),
        ),
        TestCase::check(
            "fg outward reads text stock",
            true,
            validate_fg_material_outward(&fg_text_stock, &fg_stock).is_valid(),
        ),
        TestCase::check(
            "record dispatch",
            true,
            issue_record.validate(&data).has_error_kind(ErrorKind::InsufficientStock),
        ),
    ]
}

// =============================================================================
// Edge Cases
// =============================================================================

fn edge_case_tests() -> Vec<TestCase> {
    let rows: Vec<u32> = (0..250).collect();
    let paged = handle_large_dataset(Some(rows.as_slice()), 100);

    vec![
        TestCase::check(
            "empty data uses default",
            vec!["default"],
            handle_empty_data(Some(Vec::new()), vec!["default"]),
        ),
        TestCase::check(
            "missing data uses default",
            vec![0],
            handle_empty_data(None, vec![0]),
        ),
        TestCase::check(
            "data passes through",
            vec![1, 2],
            handle_empty_data(Some(vec![1, 2]), vec![0]),
        ),
        TestCase::check(
            "date round trip",
            "2024-01-15",
            handle_date_edge_cases(Some(&FieldValue::from("2024-01-15"))),
        ),
        TestCase::check(
            "missing date is today",
            format_date(today()),
            handle_date_edge_cases(None),
        ),
        TestCase::check(
            "numeric fallback",
            7.0,
            handle_numeric_edge_cases(Some(&FieldValue::from("abc")), 7.0),
        ),
        TestCase::check(
            "numeric parse",
            42.5,
            handle_numeric_edge_cases(Some(&FieldValue::from(" 42.5 ")), 0.0),
        ),
        TestCase::check("large dataset page count", 3, paged.total_pages),
        TestCase::check(
            "large dataset keeps order",
            Some(200),
            paged.pages.get(2).and_then(|page| page.first().copied()),
        ),
        TestCase::check(
            "missing dataset has no pages",
            0,
            handle_large_dataset::<u32>(None, 100).total_pages,
        ),
    ]
}

// =============================================================================
// Error Handlers
// =============================================================================

async fn error_handler_tests() -> Vec<TestCase> {
    let status_kind = |status: u16| handle_api_error(&ServiceError::http(status, "failure"), "selftest").kind;

    let mut calls = 0_u32;
    let exhausted: Result<(), String> = retry(&fast_policy(), "selftest", || {
        calls += 1;
        async { Err("conflict".to_string()) }
    })
    .await;

    let first_try: Result<&str, String> =
        handle_concurrent_stock_update(|| async { Ok("updated") }, 3).await;

    vec![
        TestCase::check("400 is invalid data", ErrorKind::InvalidNumber, status_kind(400)),
        TestCase::check("401 is network error", ErrorKind::NetworkError, status_kind(401)),
        TestCase::check("403 is network error", ErrorKind::NetworkError, status_kind(403)),
        TestCase::check("404 is sheet not found", ErrorKind::SheetNotFound, status_kind(404)),
        TestCase::check("500 is network error", ErrorKind::NetworkError, status_kind(500)),
        TestCase::check("503 is network error", ErrorKind::NetworkError, status_kind(503)),
        TestCase::check(
            "unlisted status carries its code",
            "Server error (503). Please try again later.",
            handle_api_error(&ServiceError::http(503, "unavailable"), "selftest").message,
        ),
        TestCase::check(
            "no response is network error",
            ErrorKind::NetworkError,
            handle_api_error(&ServiceError::no_response("offline"), "selftest").kind,
        ),
        TestCase::check(
            "unknown keeps message",
            "quota exceeded",
            handle_api_error(&ServiceError::other("quota exceeded"), "selftest").message,
        ),
        TestCase::check(
            "missing sheet",
            ErrorKind::SheetNotFound,
            handle_sheet_error(
                &ServiceError::other("Sheet does not exist"),
                "Material Inward",
                "selftest",
            )
            .kind,
        ),
        TestCase::check(
            "expired token",
            ErrorKind::NetworkError,
            handle_sheet_error(&ServiceError::other("Invalid access token"), "Stock", "selftest").kind,
        ),
        TestCase::check("retry attempts", 3, calls),
        TestCase::check("retry returns last error", Some("conflict"), exhausted.err()),
        TestCase::check("stock update first try", Some("updated"), first_try.ok()),
    ]
}

// =============================================================================
// Orchestration
// =============================================================================

async fn orchestration_tests() -> Vec<TestCase> {
    let handler = InventoryErrorHandler::with_policy(fast_policy());

    let ok = handler.run_async("load", || async { Ok::<_, ServiceError>(5) }).await;
    let ok_loading = handler.is_loading();

    let failed = handler
        .run_async("load", || async { Err::<u32, _>(ServiceError::no_response("offline")) })
        .await;
    let general_after_failure = handler.has_field_error(GENERAL_FIELD);

    let sheet = handler
        .run_sheet("FG Stock", "read", || async {
            Err::<u32, _>(ServiceError::other("Range FG Stock!A1 does not exist"))
        })
        .await;
    let sheet_message = handler.field_error(GENERAL_FIELD);

    let stock = handler
        .run_stock_update(|| async { Err::<(), _>(ServiceError::http(409, "conflict")) })
        .await;
    let stock_error = handler.has_field_error(STOCK_FIELD);

    let ops: Vec<BoxFuture<'static, Result<u32, ServiceError>>> = vec![
        async { Ok(1) }.boxed(),
        async { Err(ServiceError::http(400, "bad row")) }.boxed(),
        async { Ok(3) }.boxed(),
    ];
    let bulk = handler.run_bulk("import", ops).await;

    let form_valid = handler.validate_form(|| {
        validate_material_issue(
            &material_issue_with(|r| r.issued_to = None),
            Some(&stock_levels()),
        )
    });
    let snackbar = handler.create_snackbar_message(SnackbarKind::Error);

    vec![
        TestCase::check("async success data", Some(5), ok.data),
        TestCase::check("loading cleared after success", false, ok_loading),
        TestCase::check(
            "async failure classified",
            Some(ErrorKind::NetworkError),
            failed.error.map(|e| e.kind),
        ),
        TestCase::check("async failure recorded as general", true, general_after_failure),
        TestCase::check(
            "sheet failure classified",
            Some(ErrorKind::SheetNotFound),
            sheet.error.map(|e| e.kind),
        ),
        TestCase::check(
            "sheet failure names the sheet",
            Some("Sheet \"FG Stock\" does not exist. Please check the sheet configuration."),
            sheet_message.as_deref(),
        ),
        TestCase::check("stock failure", false, stock.success),
        TestCase::check("stock failure recorded as stock", true, stock_error),
        TestCase::check("bulk result count", 3, bulk.results.len()),
        TestCase::check(
            "bulk indices",
            vec![0, 1, 2],
            bulk.results.iter().map(|r| r.index).collect::<Vec<_>>(),
        ),
        TestCase::check("bulk middle failed", false, bulk.results[1].success),
        TestCase::check("bulk last still ran", Some(3), bulk.results[2].data),
        TestCase::check("bulk summary failed", 1, bulk.summary.failed),
        TestCase::check("form invalid", false, form_valid),
        TestCase::check(
            "snackbar shows first error",
            Some("Issued To is required"),
            snackbar.map(|s| s.message),
        ),
        TestCase::check("loading cleared at end", false, handler.is_loading()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_check() {
        let pass = TestCase::check("same", vec![1, 2], vec![1, 2]);
        assert!(pass.passed);
        let fail = TestCase::check("different", "a", "b");
        assert!(!fail.passed);
        assert_eq!(fail.expected, Value::String("a".into()));
    }

    #[test]
    fn test_summary_counts() {
        let summary = TestSummary::from_tests(vec![
            TestCase::check("a", 1, 1),
            TestCase::check("b", 1, 2),
        ]);
        assert_eq!((summary.total, summary.passed, summary.failed), (2, 1, 1));
        assert_eq!(summary.failures().count(), 1);
        assert!(!summary.all_passed());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("edge-cases".parse(), Ok(TestCategory::EdgeCases));
        assert_eq!("Entity_Validators".parse(), Ok(TestCategory::EntityValidators));
        assert!("nope".parse::<TestCategory>().is_err());
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = TestSummary::from_tests(vec![TestCase::check("a", 1, 1)]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["tests"][0]["testName"], "a");
        assert_eq!(json["total"], 1);
    }

    #[tokio::test]
    async fn test_each_category_passes() {
        for category in TestCategory::ALL {
            let summary = run_test_category(category).await;
            let failures: Vec<_> = summary.failures().collect();
            assert!(failures.is_empty(), "{}: {:?}", category, failures);
        }
    }
}
