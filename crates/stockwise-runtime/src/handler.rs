//! # Inventory Error Handler
//!
//! A stateful service that wraps async work with loading and error state.
//!
//! ## Operation Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      One Operation Attempt                              │
//! │                                                                         │
//! │   caller ──► wait for gate (FIFO) ──► loading = true ──► clear errors   │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                                      await operation                    │
//! │                                    ┌─────────┴─────────┐                │
//! │                                    ▼                   ▼                │
//! │                                 success             failure             │
//! │                             { data, error:    classify → field error   │
//! │                               None }          { data: None, error }     │
//! │                                    └─────────┬─────────┘                │
//! │                                              ▼                          │
//! │                     loading = false (drop guard, also on cancel/panic)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State
//! ```text
//! errors     field → message   one message per field, last write wins
//! warnings   field → message   same shape, never blocks a submit
//! loading    bool              true only while an operation holds the gate
//! ```
//!
//! ## Thread Safety
//! The handler is a cheap `Clone`. State sits behind `Arc<Mutex<_>>`, held
//! only for the duration of a read or write, never across an `.await`.
//! Operations on one handler are serialized through a tokio `Mutex<()>`,
//! which grants the lock in FIFO order, so two callers never interleave
//! their loading and error updates.
//!
//! The gate is reentrant within a task: while an operation holds it, a
//! task-local marker records the handler, and nested operations on the
//! same handler (a bulk item doing a stock update, a `run_async` body
//! calling `run_async`) run inside the outer turn instead of waiting on it.
//! Nested operations leave the loading flag to the outer one. Work moved
//! to a separately spawned task does not inherit the marker.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::FutureExt;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use stockwise_core::{
    ClassifiedError, ComparisonData, ErrorKind, InventoryRecord, ServiceError, ValidationContext,
    ValidationResult,
};
use tracing::{debug, error, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::classify::{handle_api_error, handle_sheet_error};
use crate::config::StockwiseConfig;
use crate::retry::{retry, RetryPolicy};

/// Field key for errors not tied to a form field.
pub const GENERAL_FIELD: &str = "general";

/// Field key for stock update failures.
pub const STOCK_FIELD: &str = "stock";

const STOCK_UPDATE: &str = "stock update";

tokio::task_local! {
    /// Gates held by the current task, by address.
    static HELD_GATES: Vec<usize>;
}

// =============================================================================
// Field Messages
// =============================================================================

/// Field → message map that keeps first-insertion order.
///
/// Setting a field that already has a message replaces it in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMessages(Vec<(String, String)>);

impl FieldMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.0.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = message,
            None => self.0.push((field, message)),
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        let index = self.0.iter().position(|(f, _)| f == field)?;
        Some(self.0.remove(index).1)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// The earliest recorded field and message.
    pub fn first(&self) -> Option<(&str, &str)> {
        self.0.first().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl Serialize for FieldMessages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, message) in &self.0 {
            map.serialize_entry(field, message)?;
        }
        map.end()
    }
}

/// Observable handler state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorState {
    pub errors: FieldMessages,
    pub warnings: FieldMessages,
    pub loading: bool,
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of one wrapped operation: `{ success, data, error }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationOutcome<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ClassifiedError>,
}

impl<T> OperationOutcome<T> {
    fn succeeded(data: T) -> Self {
        OperationOutcome {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failed(error: ClassifiedError) -> Self {
        OperationOutcome {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T> From<Result<T, ClassifiedError>> for OperationOutcome<T> {
    fn from(result: Result<T, ClassifiedError>) -> Self {
        match result {
            Ok(data) => Self::succeeded(data),
            Err(error) => Self::failed(error),
        }
    }
}

/// One item of a bulk run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkItem<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ClassifiedError>,
    /// Position of the operation in the submitted batch.
    pub index: usize,
}

/// A failed bulk item, for the `errors` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkFailure {
    pub index: usize,
    pub error: ClassifiedError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Result of [`InventoryErrorHandler::run_bulk`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkOutcome<T> {
    /// True when every item succeeded.
    pub success: bool,
    pub results: Vec<BulkItem<T>>,
    pub errors: Vec<BulkFailure>,
    pub summary: BulkSummary,
}

// =============================================================================
// Snackbar
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnackbarKind {
    Error,
    Warning,
}

/// Toast payload: `{ open, message, severity }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnackbarMessage {
    pub open: bool,
    pub message: String,
    pub severity: SnackbarKind,
}

// =============================================================================
// Handler
// =============================================================================

/// Loading/error state plus the operations that drive it.
#[derive(Debug, Clone)]
pub struct InventoryErrorHandler {
    state: Arc<Mutex<ErrorState>>,
    gate: Arc<tokio::sync::Mutex<()>>,
    policy: RetryPolicy,
}

impl Default for InventoryErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryErrorHandler {
    /// A handler with the default retry policy (3 attempts, 1s, 2s).
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::default())
    }

    pub fn with_policy(policy: RetryPolicy) -> Self {
        InventoryErrorHandler {
            state: Arc::new(Mutex::new(ErrorState::default())),
            gate: Arc::new(tokio::sync::Mutex::new(())),
            policy,
        }
    }

    pub fn from_config(config: &StockwiseConfig) -> Self {
        Self::with_policy(config.retry_policy())
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn gate_id(&self) -> usize {
        Arc::as_ptr(&self.gate) as usize
    }

    fn holds_gate(&self) -> bool {
        let id = self.gate_id();
        HELD_GATES
            .try_with(|held| held.contains(&id))
            .unwrap_or(false)
    }

    /// Runs `work` inside this handler's turn, with `loading` set.
    ///
    /// Already inside a turn of this handler, `work` runs directly.
    async fn exclusive<R>(&self, work: impl Future<Output = R>) -> R {
        if self.holds_gate() {
            debug!("Nested operation joins the current turn");
            return work.await;
        }

        let _turn = self.gate.lock().await;
        let _loading = LoadingGuard::start(self);

        let mut held = HELD_GATES.try_with(Vec::clone).unwrap_or_default();
        held.push(self.gate_id());
        HELD_GATES.scope(held, work).await
    }

    /// Runs `f` with the state locked. A poisoned lock is recovered: the
    /// state is plain data and every write leaves it consistent.
    fn with_state<R>(&self, f: impl FnOnce(&mut ErrorState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    // =========================================================================
    // Async Operations
    // =========================================================================

    /// Runs a service call, classifying failures with [`handle_api_error`].
    pub async fn run_async<T, F, Fut>(&self, operation: &str, op: F) -> OperationOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        self.run_classified(operation, op, |err| handle_api_error(err, operation))
            .await
    }

    /// Runs a sheet call, classifying failures with [`handle_sheet_error`].
    pub async fn run_sheet<T, F, Fut>(&self, sheet: &str, operation: &str, op: F) -> OperationOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        self.run_classified(operation, op, |err| handle_sheet_error(err, sheet, operation))
            .await
    }

    async fn run_classified<T, F, Fut, C>(&self, operation: &str, op: F, classify: C) -> OperationOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
        C: FnOnce(&ServiceError) -> ClassifiedError,
    {
        self.exclusive(async {
            self.with_state(|state| state.errors.clear());

            match op().await {
                Ok(data) => {
                    debug!("Operation succeeded");
                    OperationOutcome::succeeded(data)
                }
                Err(err) => {
                    let classified = classify(&err);
                    self.set_field_error(GENERAL_FIELD, classified.message.clone());
                    OperationOutcome::failed(classified)
                }
            }
        })
        .instrument(operation_span(operation))
        .await
    }

    /// Runs a stock update with this handler's retry policy.
    ///
    /// Only the `"stock"` field error is cleared beforehand; a terminal
    /// failure is recorded under `"stock"`.
    pub async fn run_stock_update<T, F, Fut>(&self, update: F) -> OperationOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        self.run_stock_update_with(update, self.policy.max_attempts).await
    }

    /// [`run_stock_update`](Self::run_stock_update) with an explicit attempt count.
    pub async fn run_stock_update_with<T, F, Fut>(&self, update: F, retries: u32) -> OperationOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let policy = RetryPolicy {
            max_attempts: retries,
            ..self.policy
        };

        self.exclusive(async {
            self.clear_field_error(STOCK_FIELD);

            match retry(&policy, STOCK_UPDATE, update).await {
                Ok(data) => OperationOutcome::succeeded(data),
                Err(err) => {
                    let classified = handle_api_error(&err, STOCK_UPDATE);
                    self.set_field_error(STOCK_FIELD, classified.message.clone());
                    OperationOutcome::failed(classified)
                }
            }
        })
        .instrument(operation_span(STOCK_UPDATE))
        .await
    }

    /// Runs every operation in order, one at a time, never stopping early.
    ///
    /// A failing or panicking item is recorded and the batch moves on.
    /// Items already completed are not rolled back.
    pub async fn run_bulk<T, I, Fut>(&self, operation: &str, operations: I) -> BulkOutcome<T>
    where
        I: IntoIterator<Item = Fut>,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        self.exclusive(async {
            self.with_state(|state| state.errors.clear());

            let mut results = Vec::new();
            let mut errors = Vec::new();

            for (index, op) in operations.into_iter().enumerate() {
                let outcome = match AssertUnwindSafe(op).catch_unwind().await {
                    Ok(Ok(data)) => Ok(data),
                    Ok(Err(err)) => Err(handle_api_error(&err, operation)),
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        error!(index, error = %message, "Bulk item panicked");
                        Err(ClassifiedError::new(ErrorKind::UnknownError, message))
                    }
                };

                results.push(match outcome {
                    Ok(data) => BulkItem {
                        success: true,
                        data: Some(data),
                        error: None,
                        index,
                    },
                    Err(error) => {
                        errors.push(BulkFailure {
                            index,
                            error: error.clone(),
                        });
                        BulkItem {
                            success: false,
                            data: None,
                            error: Some(error),
                            index,
                        }
                    }
                });
            }

            let summary = BulkSummary {
                total: results.len(),
                successful: results.len() - errors.len(),
                failed: errors.len(),
            };

            if summary.failed > 0 {
                warn!(failed = summary.failed, total = summary.total, "Bulk operation finished with failures");
                self.set_field_error(
                    GENERAL_FIELD,
                    format!("{} of {} operations failed", summary.failed, summary.total),
                );
            }

            BulkOutcome {
                success: errors.is_empty(),
                results,
                errors,
                summary,
            }
        })
        .instrument(operation_span(operation))
        .await
    }

    // =========================================================================
    // Form Validation
    // =========================================================================

    /// Runs a validator and mirrors its errors and warnings into the field
    /// maps. Returns whether the record passed.
    ///
    /// A panicking validator is reported under `"general"` and counts as a
    /// failure.
    pub fn validate_form<F>(&self, validator: F) -> bool
    where
        F: FnOnce() -> ValidationResult,
    {
        self.with_state(|state| {
            state.errors.clear();
            state.warnings.clear();
        });

        match panic::catch_unwind(AssertUnwindSafe(validator)) {
            Ok(result) => {
                self.with_state(|state| {
                    for err in result.errors() {
                        state.errors.set(err.field(), err.message());
                    }
                    for warning in result.warnings() {
                        state.warnings.set(warning.field(), warning.message());
                    }
                });
                if !result.is_valid() {
                    debug!(errors = result.errors().len(), "Form validation failed");
                }
                result.is_valid()
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(error = %message, "Validator panicked");
                self.set_field_error(GENERAL_FIELD, format!("Validation failed: {}", message));
                false
            }
        }
    }

    /// [`validate_form`](Self::validate_form) over a tagged record.
    pub fn validate_record(
        &self,
        context: &ValidationContext,
        record: &InventoryRecord,
        data: &ComparisonData<'_>,
    ) -> bool {
        self.validate_form(|| context.validate_record(record, data))
    }

    // =========================================================================
    // State Accessors
    // =========================================================================

    pub fn set_field_error(&self, field: &str, message: impl Into<String>) {
        self.with_state(|state| state.errors.set(field, message));
    }

    pub fn clear_field_error(&self, field: &str) {
        self.with_state(|state| {
            state.errors.remove(field);
        });
    }

    /// Clears every error and warning.
    pub fn clear_errors(&self) {
        self.with_state(|state| {
            state.errors.clear();
            state.warnings.clear();
        });
    }

    pub fn field_error(&self, field: &str) -> Option<String> {
        self.with_state(|state| state.errors.get(field).map(str::to_string))
    }

    pub fn has_field_error(&self, field: &str) -> bool {
        self.with_state(|state| state.errors.contains(field))
    }

    pub fn has_errors(&self) -> bool {
        self.with_state(|state| !state.errors.is_empty())
    }

    pub fn has_warnings(&self) -> bool {
        self.with_state(|state| !state.warnings.is_empty())
    }

    pub fn errors(&self) -> FieldMessages {
        self.with_state(|state| state.errors.clone())
    }

    pub fn warnings(&self) -> FieldMessages {
        self.with_state(|state| state.warnings.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.with_state(|state| state.loading)
    }

    pub fn snapshot(&self) -> ErrorState {
        self.with_state(|state| state.clone())
    }

    /// The first error (or warning) as a snackbar payload, if there is one.
    pub fn create_snackbar_message(&self, kind: SnackbarKind) -> Option<SnackbarMessage> {
        self.with_state(|state| {
            let messages = match kind {
                SnackbarKind::Error => &state.errors,
                SnackbarKind::Warning => &state.warnings,
            };
            messages.first().map(|(_, message)| SnackbarMessage {
                open: true,
                message: message.to_string(),
                severity: kind,
            })
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Holds `loading = true` for its lifetime.
struct LoadingGuard<'a> {
    handler: &'a InventoryErrorHandler,
}

impl<'a> LoadingGuard<'a> {
    fn start(handler: &'a InventoryErrorHandler) -> Self {
        handler.with_state(|state| state.loading = true);
        LoadingGuard { handler }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.handler.with_state(|state| state.loading = false);
    }
}

fn operation_span(operation: &str) -> Span {
    info_span!("operation", id = %Uuid::new_v4(), operation = %operation)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "operation panicked".to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
