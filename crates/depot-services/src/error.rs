//! Service-layer error type.
//!
//! Services surface either a domain failure ([`CoreError`]) or a storage
//! failure ([`DbError`]), transparently. Unique-constraint violations
//! from the store are lifted into the domain `Duplicate` variant; every
//! other persistence failure propagates unchanged for the boundary layer
//! to retry or report.

use thiserror::Error;

use depot_core::{CoreError, ValidationError};
use depot_db::DbError;

/// Error type returned by every service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The storage layer failed.
    #[error(transparent)]
    Db(DbError),
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            // A lost race on a unique business key is a domain duplicate,
            // not an opaque storage failure.
            DbError::UniqueViolation { field, value } => {
                ServiceError::Core(CoreError::Duplicate { field, value })
            }
            other => ServiceError::Db(other),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::from(DbError::from(err))
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

/// Convenience type alias for Results with ServiceError.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_becomes_domain_duplicate() {
        let err: ServiceError = DbError::duplicate("sku", "SKU-100").into();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::Duplicate { .. })
        ));
    }

    #[test]
    fn other_db_errors_pass_through() {
        let err: ServiceError = DbError::PoolExhausted.into();
        assert!(matches!(err, ServiceError::Db(DbError::PoolExhausted)));
    }
}
