//! Input validation rules, applied at service entry before any lookup.
//!
//! Storage constraints (NOT NULL, UNIQUE, foreign keys) back these up at
//! the database layer; this module catches bad input early with precise
//! errors.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a movement/reservation quantity. Zero-unit operations are
/// rejected: they would append meaningless ledger rows.
pub fn validate_quantity(field: &'static str, quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a caller/service identity threaded into `created_by` fields.
/// The ledger is only meaningful when every row names a real actor.
pub fn validate_actor(actor: &str) -> ValidationResult<()> {
    if actor.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "actor".to_string(),
        });
    }
    Ok(())
}

/// Validates a short business code (warehouse code, SKU).
pub fn validate_code(field: &'static str, code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::Invalid {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a required display name.
pub fn validate_name(field: &'static str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_quantity("quantity", 1).is_ok());
        assert!(validate_quantity("quantity", 0).is_err());
        assert!(validate_quantity("quantity", -5).is_err());
    }

    #[test]
    fn actor_must_not_be_blank() {
        assert!(validate_actor("picker-7").is_ok());
        assert!(validate_actor("  ").is_err());
    }

    #[test]
    fn code_rules() {
        assert!(validate_code("code", "WH-EAST_1").is_ok());
        assert!(validate_code("code", "").is_err());
        assert!(validate_code("code", "no spaces").is_err());
        assert!(validate_code("code", &"X".repeat(51)).is_err());
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("name", "East Coast DC").is_ok());
        assert!(validate_name("name", " ").is_err());
    }
}
