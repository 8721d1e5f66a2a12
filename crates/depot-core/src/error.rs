//! # Error Types
//!
//! Domain-specific error types for depot-core.
//!
//! ## Error Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  depot-core errors (this file)                                  │
//! │  ├── CoreError        - Domain rule violations                  │
//! │  └── ValidationError  - Input validation failures               │
//! │                                                                 │
//! │  depot-db errors (separate crate)                               │
//! │  └── DbError          - Storage operation failures              │
//! │                                                                 │
//! │  depot-services                                                 │
//! │  └── ServiceError     - Either of the above, transparently      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure is an enum variant carrying the identifiers the caller
//! needs to recover: `InsufficientStock` names the product plus the
//! requested and available quantities, `InvalidStateTransition` names the
//! session and the state it is stuck in.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations.
///
/// Recoverable by the caller (correct the identifier, reduce the
/// quantity) except `InvalidStateTransition`, which is fatal to the
/// request but not the process.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No inventory record exists for the product.
    #[error("inventory item not found for product {0}")]
    ItemNotFound(String),

    /// The warehouse does not exist.
    #[error("warehouse not found: {0}")]
    WarehouseNotFound(String),

    /// The product has no stock record at the warehouse.
    #[error("no stock record for product {product_id} in warehouse {warehouse_id}")]
    StockNotFound {
        product_id: String,
        warehouse_id: String,
    },

    /// The count session does not exist.
    #[error("inventory count not found: {0}")]
    CountNotFound(String),

    /// The stock transfer does not exist.
    #[error("stock transfer not found: {0}")]
    TransferNotFound(String),

    /// More stock was requested than can be taken or promised.
    ///
    /// Raised by remove/reserve/adjust operations. `available` is what the
    /// failed check compared against, so the caller can retry with less.
    #[error("insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// An operation was attempted outside its legal states, e.g.
    /// completing a Draft count or cancelling a Completed one.
    #[error("{entity} {id} is {status}, cannot {operation}")]
    InvalidStateTransition {
        entity: &'static str,
        id: String,
        status: String,
        operation: &'static str,
    },

    /// A warehouse cannot be deleted while stock rows in it still hold
    /// units.
    #[error("warehouse {0} still holds stock and cannot be deleted")]
    WarehouseNotEmpty(String),

    /// A unique business key (product_id, sku, warehouse code) already
    /// exists.
    #[error("duplicate {field}: '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Input validation failure (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Shorthand for the `InvalidStateTransition` variant.
    pub fn invalid_transition(
        entity: &'static str,
        id: impl Into<String>,
        status: impl ToString,
        operation: &'static str,
    ) -> Self {
        CoreError::InvalidStateTransition {
            entity,
            id: id.into(),
            status: status.to_string(),
            operation,
        }
    }

    /// Shorthand for the `Duplicate` variant.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        CoreError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A quantity that must be strictly positive was zero or negative.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Field value is structurally invalid.
    #[error("{field} is invalid: {reason}")]
    Invalid { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_carries_quantities() {
        let err = CoreError::InsufficientStock {
            product_id: "P-100".to_string(),
            requested: 5,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product P-100: available 3, requested 5"
        );
    }

    #[test]
    fn invalid_transition_message_names_the_stuck_state() {
        let err = CoreError::invalid_transition(
            "inventory count",
            "ic-1",
            crate::state::CountStatus::Completed,
            "cancel",
        );
        assert_eq!(
            err.to_string(),
            "inventory count ic-1 is completed, cannot cancel"
        );
    }

    #[test]
    fn validation_converts_to_core_error() {
        let err: CoreError = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
