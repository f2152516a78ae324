//! # stockwise-core: Pure Validation Logic for Stockwise
//!
//! This crate holds every rule an inventory entry must pass before it is
//! written to a register sheet. It has no I/O: no sheet access, no network,
//! no timers.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockwise Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Entry Forms / Sheet Client                   │   │
//! │  │    Inward form ──► Issue form ──► FG forms ──► Sheet API       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               stockwise-runtime                                 │   │
//! │  │    error handler, retry, classification, config, tracing        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockwise-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ validation│  │ inventory │  │edge_cases │  │   │
//! │  │   │  records  │  │  field    │  │  entity   │  │ normalize │  │   │
//! │  │   │  stock    │  │  rules    │  │  rules    │  │  paging   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO TIMERS • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Records, statuses, and comparison datasets
//! - [`error`] - Error taxonomy, validation errors and warnings
//! - [`validation`] - Field validators and `ValidationResult`
//! - [`inventory`] - Entity validators for the four registers
//! - [`edge_cases`] - Total normalizers for empty, malformed, or large input
//! - [`dates`] - Lenient date parsing and `YYYY-MM-DD` formatting
//!
//! ## Example Usage
//!
//! ```rust
//! use stockwise_core::inventory::validate_material_issue;
//! use stockwise_core::types::{field, MaterialIssue, StockLevels};
//! use stockwise_core::ErrorKind;
//!
//! let stock: StockLevels = [("RM-001", 100.0)].into_iter().collect();
//! let issue = MaterialIssue {
//!     date: field("2024-01-15"),
//!     item_code: field("RM-001"),
//!     item_name: field("Steel Rod"),
//!     quantity: field(150.0),
//!     issued_to: field("Assembly"),
//!     status: field("Completed"),
//!     ..Default::default()
//! };
//!
//! let result = validate_material_issue(&issue, Some(&stock));
//! assert!(!result.is_valid());
//! assert!(result.has_error_kind(ErrorKind::InsufficientStock));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dates;
pub mod edge_cases;
pub mod error;
pub mod inventory;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ClassifiedError, ErrorKind, ServiceError, ValidationError, ValidationWarning};
pub use inventory::ValidationContext;
pub use types::*;
pub use validation::{FieldResult, ValidationResult};
