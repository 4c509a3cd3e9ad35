//! Error types for lookup construction

use thiserror::Error;

/// A lookup that would be rejected before it is sent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Order item at position {position} has no field name")]
    EmptyOrderField { position: usize },

    #[error("Order field {field} appears more than once")]
    DuplicateOrderField { field: String },

    #[error("Projection contains an empty field name")]
    EmptyProjectionField,

    #[error("Page size {size} exceeds the maximum of {max}")]
    PageSizeExceeded { size: u64, max: u64 },

    #[error("Invalid order item {raw:?}: {reason}")]
    InvalidOrderItem { raw: String, reason: String },
}

/// Result type alias for lookup operations.
pub type LookupResult<T> = Result<T, LookupError>;
