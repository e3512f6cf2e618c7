//! Domain services: input validation and handler semantics per entity.

pub mod category_service;
pub mod order_item_service;
pub mod order_service;
pub mod product_service;
pub mod user_service;

use crate::error::DomainError;

const MAX_NAME_LENGTH: usize = 100;

/// Validate a name field: trimmed, non-empty, bounded length.
/// Returns the trimmed value to be persisted.
pub(crate) fn validate_name(field: &'static str, raw: &str) -> Result<String, DomainError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation(field, format!("{} cannot be empty", field)));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(DomainError::validation(
            field,
            format!("{} cannot exceed {} characters", field, MAX_NAME_LENGTH),
        ));
    }
    Ok(name.to_string())
}

/// Validate an email address: structural check, no delivery guarantee.
/// Returns the trimmed value to be persisted.
pub(crate) fn validate_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(DomainError::validation("email", "email cannot be empty"));
    }
    if email.contains(char::is_whitespace) {
        return Err(DomainError::validation(
            "email",
            format!("email cannot contain whitespace: {}", email),
        ));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(DomainError::validation(
            "email",
            format!("email must contain an @: {}", email),
        ));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(DomainError::validation(
            "email",
            format!("malformed email address: {}", email),
        ));
    }
    Ok(email.to_string())
}

/// Validate a currency amount that must be strictly positive
pub(crate) fn validate_positive_amount(field: &'static str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::validation(
            field,
            format!("{} must be greater than zero, got {}", field, value),
        ));
    }
    Ok(())
}

/// Validate a currency amount that may be zero but not negative
pub(crate) fn validate_non_negative_amount(field: &'static str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(
            field,
            format!("{} cannot be negative, got {}", field, value),
        ));
    }
    Ok(())
}

/// Validate an integer count that must be strictly positive
pub(crate) fn validate_positive_quantity(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::validation(
            field,
            format!("{} must be greater than zero, got {}", field, value),
        ));
    }
    Ok(())
}

/// Validate an integer count that may be zero but not negative
pub(crate) fn validate_non_negative_quantity(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value < 0 {
        return Err(DomainError::validation(
            field,
            format!("{} cannot be negative, got {}", field, value),
        ));
    }
    Ok(())
}
