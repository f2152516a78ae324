//! # Self-Test Runner
//!
//! Runs the validation self-test suite and prints a tally.
//!
//! ## Usage
//! ```bash
//! # Every category
//! cargo run -p stockwise-testkit --bin selftest
//!
//! # One category
//! cargo run -p stockwise-testkit --bin selftest -- edge-cases
//!
//! # Machine-readable output
//! cargo run -p stockwise-testkit --bin selftest -- --json
//! ```
//!
//! Exits with status 1 when any check fails.

use std::env;

use stockwise_runtime::{init_tracing, StockwiseConfig};
use stockwise_testkit::{run_all_tests, run_test_category, TestCategory, TestSummary};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut category: Option<TestCategory> = None;
    let mut json = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "--help" | "-h" => {
                println!("Stockwise Self-Test");
                println!();
                println!("Usage: selftest [CATEGORY] [--json]");
                println!();
                println!("Categories:");
                for c in TestCategory::ALL {
                    println!("  {}", c);
                }
                return Ok(());
            }
            other => category = Some(other.parse()?),
        }
    }

    let config = StockwiseConfig::load_or_default(None);
    init_tracing(config.log_filter());

    let summary = match category {
        Some(c) => run_test_category(c).await,
        None => run_all_tests().await,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_report(category, &summary);
    }

    if !summary.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(category: Option<TestCategory>, summary: &TestSummary) {
    println!("Stockwise Self-Test");
    println!("===================");
    println!(
        "Category: {}",
        category.map_or_else(|| "all".to_string(), |c| c.to_string())
    );
    println!();

    for test in &summary.tests {
        let mark = if test.passed { "✓" } else { "✗" };
        println!("  {} {}", mark, test.test_name);
        if !test.passed {
            println!("      expected: {}", test.expected);
            println!("      actual:   {}", test.actual);
        }
    }

    println!();
    println!(
        "{} total, {} passed, {} failed",
        summary.total, summary.passed, summary.failed
    );
}
