//! # Error Types
//!
//! The shared error taxonomy for Stockwise.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockwise-core errors (this file)                                     │
//! │  ├── ErrorKind         - Closed set of 12 classifications              │
//! │  ├── ValidationError   - A failed rule on one field                    │
//! │  ├── ValidationWarning - A soft notice on one field (never fails)      │
//! │  ├── ServiceError      - What the sheet service / API raised           │
//! │  └── ClassifiedError   - ServiceError after classification            │
//! │                                                                         │
//! │  stockwise-runtime errors (separate crate)                             │
//! │  └── RuntimeError      - Config load/save failures                     │
//! │                                                                         │
//! │  Flow: ServiceError ─► handle_api_error ─► ClassifiedError ─► UI      │
//! │        record ─► validators ─► ValidationError ─► UI                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both flows end in the same `{ type, message }` shape, keyed by the same
//! [`ErrorKind`], so the forms never have to care where a failure came from.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Error Kind
// =============================================================================

/// Classification shared by validators and error handlers.
///
/// The set is closed: new failure modes map onto the closest existing kind
/// instead of inventing a free-text error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    RequiredField,
    InvalidNumber,
    NegativeNumber,
    InsufficientStock,
    DuplicateEntry,
    InvalidDate,
    FutureDate,
    InvalidStatus,
    ProductNotFound,
    SheetNotFound,
    NetworkError,
    UnknownError,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [ErrorKind; 12] = [
        ErrorKind::RequiredField,
        ErrorKind::InvalidNumber,
        ErrorKind::NegativeNumber,
        ErrorKind::InsufficientStock,
        ErrorKind::DuplicateEntry,
        ErrorKind::InvalidDate,
        ErrorKind::FutureDate,
        ErrorKind::InvalidStatus,
        ErrorKind::ProductNotFound,
        ErrorKind::SheetNotFound,
        ErrorKind::NetworkError,
        ErrorKind::UnknownError,
    ];

    /// Wire name, identical to the serialized form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::RequiredField => "REQUIRED_FIELD",
            ErrorKind::InvalidNumber => "INVALID_NUMBER",
            ErrorKind::NegativeNumber => "NEGATIVE_NUMBER",
            ErrorKind::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorKind::DuplicateEntry => "DUPLICATE_ENTRY",
            ErrorKind::InvalidDate => "INVALID_DATE",
            ErrorKind::FutureDate => "FUTURE_DATE",
            ErrorKind::InvalidStatus => "INVALID_STATUS",
            ErrorKind::ProductNotFound => "PRODUCT_NOT_FOUND",
            ErrorKind::SheetNotFound => "SHEET_NOT_FOUND",
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// The canonical message template for this kind.
    ///
    /// Validators specialize these with the field name and numbers through
    /// the [`ValidationError`] constructors.
    pub const fn template(&self) -> &'static str {
        match self {
            ErrorKind::RequiredField => "This field is required",
            ErrorKind::InvalidNumber => "Please enter a valid number",
            ErrorKind::NegativeNumber => "Value cannot be negative",
            ErrorKind::InsufficientStock => "Insufficient stock available",
            ErrorKind::DuplicateEntry => "This entry already exists",
            ErrorKind::InvalidDate => "Please enter a valid date",
            ErrorKind::FutureDate => "Date cannot be in the future",
            ErrorKind::InvalidStatus => "Invalid status selected",
            ErrorKind::ProductNotFound => "Product not found",
            ErrorKind::SheetNotFound => "Data sheet not found",
            ErrorKind::NetworkError => "Network error. Please check your connection",
            ErrorKind::UnknownError => "An unexpected error occurred",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A failed rule on one field of a record.
///
/// Immutable once built; compare by value.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[error("{message}")]
pub struct ValidationError {
    field: String,
    #[serde(rename = "type")]
    kind: ErrorKind,
    message: String,
}

impl ValidationError {
    /// Creates an error with an explicit message.
    pub fn new(field: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }

    /// Field name the error belongs to (the sheet column name).
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    // -------------------------------------------------------------------------
    // Canonical constructors, one family per kind
    // -------------------------------------------------------------------------

    pub fn required(field: &str) -> Self {
        Self::new(field, ErrorKind::RequiredField, format!("{} is required", field))
    }

    pub fn invalid_number(field: &str) -> Self {
        Self::new(
            field,
            ErrorKind::InvalidNumber,
            format!("{} must be a valid number", field),
        )
    }

    pub fn zero_not_allowed(field: &str) -> Self {
        Self::new(
            field,
            ErrorKind::InvalidNumber,
            format!("{} must be greater than 0", field),
        )
    }

    pub fn negative(field: &str) -> Self {
        Self::new(
            field,
            ErrorKind::NegativeNumber,
            format!("{} cannot be negative", field),
        )
    }

    /// Number outside `[min, max]`. An infinite `max` reads as a lower bound only.
    pub fn out_of_range(field: &str, min: f64, max: f64) -> Self {
        let message = if max.is_infinite() {
            format!("{} must be at least {}", field, min)
        } else {
            format!("{} must be between {} and {}", field, min, max)
        };
        Self::new(field, ErrorKind::InvalidNumber, message)
    }

    pub fn invalid_date(field: &str) -> Self {
        Self::new(
            field,
            ErrorKind::InvalidDate,
            format!("{} must be a valid date", field),
        )
    }

    pub fn future_date(field: &str) -> Self {
        Self::new(
            field,
            ErrorKind::FutureDate,
            format!("{} cannot be in the future", field),
        )
    }

    pub fn date_before(field: &str, min: &str) -> Self {
        Self::new(
            field,
            ErrorKind::InvalidDate,
            format!("{} must be on or after {}", field, min),
        )
    }

    pub fn date_after(field: &str, max: &str) -> Self {
        Self::new(
            field,
            ErrorKind::InvalidDate,
            format!("{} must be on or before {}", field, max),
        )
    }

    pub fn invalid_status(field: &str, allowed: &[String]) -> Self {
        Self::new(
            field,
            ErrorKind::InvalidStatus,
            format!("{} must be one of: {}", field, allowed.join(", ")),
        )
    }

    /// Product code containing characters outside `[A-Za-z0-9-_.]`.
    ///
    /// Classified as [`ErrorKind::ProductNotFound`]: no product can carry
    /// such a code.
    pub fn invalid_product_code(field: &str) -> Self {
        Self::new(
            field,
            ErrorKind::ProductNotFound,
            format!(
                "{} may only contain letters, numbers, hyphens, underscores and dots",
                field
            ),
        )
    }

    pub fn product_not_found(field: &str, code: &str) -> Self {
        Self::new(
            field,
            ErrorKind::ProductNotFound,
            format!("Product {} not found in stock", code),
        )
    }

    pub fn insufficient_stock(field: &str, code: &str, available: f64, requested: f64) -> Self {
        Self::new(
            field,
            ErrorKind::InsufficientStock,
            format!(
                "Insufficient stock for {}: available {}, requested {}",
                code, available, requested
            ),
        )
    }

    pub fn duplicate(field: &str, description: &str) -> Self {
        Self::new(
            field,
            ErrorKind::DuplicateEntry,
            format!("Duplicate entry: {} already exists", description),
        )
    }
}

// =============================================================================
// Validation Warning
// =============================================================================

/// A soft notice on one field. Never makes a result invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValidationWarning {
    field: String,
    message: String,
}

impl ValidationWarning {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationWarning {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

// =============================================================================
// Service Error
// =============================================================================

/// A failure raised by the persistence / sheet service.
///
/// ## Shapes
/// ```text
/// Http        - a response came back with a failing status code
/// NoResponse  - the request went out, nothing came back (offline, DNS, ...)
/// Other       - anything else, carrying the original message text
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("No response received: {0}")]
    NoResponse(String),

    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    /// Creates an HTTP-shaped error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ServiceError::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error for a request that got no response.
    pub fn no_response(message: impl Into<String>) -> Self {
        ServiceError::NoResponse(message.into())
    }

    /// Creates an error from arbitrary message text.
    pub fn other(message: impl Into<String>) -> Self {
        ServiceError::Other(message.into())
    }

    /// The original message text, without the status prefix.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::Http { message, .. } => message,
            ServiceError::NoResponse(message) => message,
            ServiceError::Other(message) => message,
        }
    }

    /// Response status, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind as IoKind;
        match err.kind() {
            IoKind::ConnectionRefused
            | IoKind::ConnectionReset
            | IoKind::ConnectionAborted
            | IoKind::NotConnected
            | IoKind::TimedOut
            | IoKind::BrokenPipe => ServiceError::NoResponse(err.to_string()),
            _ => ServiceError::Other(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Other(err.to_string())
    }
}

// =============================================================================
// Classified Error
// =============================================================================

/// A [`ServiceError`] after classification: `{ type, message }`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[error("{message}")]
pub struct ClassifiedError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ClassifiedError {
            kind,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for ClassifiedError {
    fn from(err: ValidationError) -> Self {
        ClassifiedError {
            kind: err.kind,
            message: err.message,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
