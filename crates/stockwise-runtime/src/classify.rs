//! # Error Classification
//!
//! Turns collaborator failures into `{ type, message }` values the UI can
//! show.
//!
//! ## Classification Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ServiceError                         ErrorKind        message          │
//! │  ───────────────────────────────────  ───────────────  ───────────────  │
//! │  Http 400                             INVALID_NUMBER   invalid data     │
//! │  Http 401                             NETWORK_ERROR    sign in again    │
//! │  Http 403                             NETWORK_ERROR    permission       │
//! │  Http 404                             SHEET_NOT_FOUND  not found        │
//! │  Http 500                             NETWORK_ERROR    server error     │
//! │  Http other                           NETWORK_ERROR    server (status)  │
//! │  NoResponse                           NETWORK_ERROR    connectivity     │
//! │  Other                                UNKNOWN_ERROR    original text    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sheet operations check the message text first: "does not exist" is a
//! missing sheet, "access token" is an expired session.

use stockwise_core::{ClassifiedError, ErrorKind, ServiceError};
use tracing::error;

/// Classifies a failed service call.
///
/// The original error is logged before classification.
pub fn handle_api_error(err: &ServiceError, operation: &str) -> ClassifiedError {
    error!(operation = %operation, error = %err, "Operation failed");

    match err {
        ServiceError::Http { status, .. } => classify_status(*status, operation),
        ServiceError::NoResponse(_) => ClassifiedError::new(
            ErrorKind::NetworkError,
            "Unable to reach the server. Please check your internet connection and try again.",
        ),
        ServiceError::Other(message) => ClassifiedError::new(
            ErrorKind::UnknownError,
            if message.is_empty() {
                format!("{} failed: {}", operation, ErrorKind::UnknownError.template())
            } else {
                message.clone()
            },
        ),
    }
}

fn classify_status(status: u16, operation: &str) -> ClassifiedError {
    match status {
        400 => ClassifiedError::new(
            ErrorKind::InvalidNumber,
            format!("Invalid data provided for {}. Please check your input.", operation),
        ),
        401 => ClassifiedError::new(
            ErrorKind::NetworkError,
            "Authentication required. Please sign in again.",
        ),
        403 => ClassifiedError::new(
            ErrorKind::NetworkError,
            "Permission denied. You do not have access to this sheet.",
        ),
        404 => ClassifiedError::new(
            ErrorKind::SheetNotFound,
            format!("Data not found for {}.", operation),
        ),
        500 => ClassifiedError::new(
            ErrorKind::NetworkError,
            "Server error. Please try again later.",
        ),
        other => ClassifiedError::new(
            ErrorKind::NetworkError,
            format!("Server error ({}). Please try again later.", other),
        ),
    }
}

/// Classifies a failed sheet operation, naming the sheet where it helps.
pub fn handle_sheet_error(err: &ServiceError, sheet: &str, operation: &str) -> ClassifiedError {
    let message = err.message();

    if message.contains("does not exist") {
        error!(operation = %operation, sheet = %sheet, error = %err, "Sheet missing");
        return ClassifiedError::new(
            ErrorKind::SheetNotFound,
            format!("Sheet \"{}\" does not exist. Please check the sheet configuration.", sheet),
        );
    }

    if message.contains("access token") {
        error!(operation = %operation, sheet = %sheet, error = %err, "Access token rejected");
        return ClassifiedError::new(
            ErrorKind::NetworkError,
            "Your session has expired. Please sign in again.",
        );
    }

    handle_api_error(err, operation)
}
