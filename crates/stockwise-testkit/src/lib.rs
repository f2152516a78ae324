//! # stockwise-testkit: Generators and Self-Test Suite
//!
//! - [`generators`] - valid records per register, with overrides, plus
//!   stock datasets
//! - [`suite`] - named checks over the validators and handlers, grouped by
//!   category, with a `{ total, passed, failed, tests }` tally
//!
//! The suite is also runnable as a binary: `cargo run -p stockwise-testkit
//! --bin selftest [category]`.

pub mod generators;
pub mod suite;

pub use suite::{run_all_tests, run_test_category, TestCase, TestCategory, TestSummary, UnknownCategory};
