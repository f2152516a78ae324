//! # stockwise-runtime: Async Orchestration for Stockwise
//!
//! Wraps calls to the sheet service with loading state, classified errors,
//! and retries, and owns configuration and logging.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Form submit                                                            │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  InventoryErrorHandler::validate_record ──► stockwise-core validators    │
//! │      │ valid                                                            │
//! │      ▼                                                                  │
//! │  InventoryErrorHandler::run_sheet / run_stock_update / run_bulk         │
//! │      │                          │                                       │
//! │      │                          └──► retry(RetryPolicy) ──► tokio sleep │
//! │      ▼                                                                  │
//! │  ServiceError ──► classify ──► ClassifiedError ──► field error map      │
//! │                                                          │              │
//! │                                                          ▼              │
//! │                                           create_snackbar_message       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`classify`] - `handle_api_error` and `handle_sheet_error`
//! - [`retry`] - `RetryPolicy`, the `retry` combinator, stock update retries
//! - [`handler`] - `InventoryErrorHandler` and its outcome types
//! - [`config`] - `StockwiseConfig` (TOML + environment)
//! - [`telemetry`] - tracing subscriber setup
//! - [`error`] - runtime error types

pub mod classify;
pub mod config;
pub mod error;
pub mod handler;
pub mod retry;
pub mod telemetry;

pub use classify::{handle_api_error, handle_sheet_error};
pub use config::StockwiseConfig;
pub use error::{RuntimeError, RuntimeResult};
pub use handler::{
    BulkOutcome, BulkSummary, ErrorState, FieldMessages, InventoryErrorHandler, OperationOutcome,
    SnackbarKind, SnackbarMessage, GENERAL_FIELD, STOCK_FIELD,
};
pub use retry::{handle_concurrent_stock_update, retry, RetryPolicy};
pub use telemetry::init_tracing;
