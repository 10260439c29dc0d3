use super::ApiError;
use crate::constants::{NUMBER_BOUNDS, limits};

/// Inclusive numeric range shared by the amount and weight validators.
#[derive(Debug, Clone, Copy)]
pub struct NumericBounds {
    pub min: i32,
    pub max: i32,
}

impl NumericBounds {
    #[must_use]
    pub const fn contains(&self, value: i32) -> bool {
        self.min <= value && value <= self.max
    }
}

pub fn validate_number(bounds: &NumericBounds, field: &str, value: i32) -> Result<i32, ApiError> {
    if !bounds.contains(value) {
        return Err(ApiError::validation(format!(
            "Invalid {}: {}. Value must be between {} and {}",
            field, value, bounds.min, bounds.max
        )));
    }
    Ok(value)
}

pub fn validate_weight(weight: i32) -> Result<i32, ApiError> {
    validate_number(&NUMBER_BOUNDS, "weight", weight)
}

pub fn validate_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Name cannot be empty"));
    }

    if trimmed.chars().count() > limits::MAX_NAME_LENGTH {
        return Err(ApiError::validation(format!(
            "Name must be {} characters or less",
            limits::MAX_NAME_LENGTH
        )));
    }

    Ok(trimmed)
}

pub fn validate_id(field: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {}: {}. ID must be a positive integer",
            field, id
        )));
    }
    Ok(id)
}
