//! Request validation shared by the services

use crate::domain::DomainError;

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", field)));
    }

    Ok(())
}

/// Rejects negative and non-finite amounts
pub(crate) fn require_amount(field: &str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!(
            "{} must be a non-negative amount, got {}",
            field, value
        )));
    }

    Ok(())
}
