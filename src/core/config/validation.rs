//! Validation helper functions for configuration types.

use crate::core::errors::{CovgapError, Result};

/// Validate that a usize value is greater than zero.
pub fn validate_positive_usize(value: usize, field: &str) -> Result<()> {
    if value == 0 {
        return Err(CovgapError::validation_field(
            format!("{} must be greater than 0", field),
            field,
        ));
    }
    Ok(())
}

/// Validate that an f64 value is a percentage in [0.0, 100.0].
pub fn validate_percentage(value: f64, field: &str) -> Result<()> {
    if !(0.0..=100.0).contains(&value) {
        return Err(CovgapError::validation_field(
            format!("{} must be between 0.0 and 100.0, got {}", field, value),
            field,
        ));
    }
    Ok(())
}

/// Validate that no pattern in the list is blank.
pub fn validate_non_empty_patterns(patterns: &[String], field: &str) -> Result<()> {
    if patterns.iter().any(|pattern| pattern.trim().is_empty()) {
        return Err(CovgapError::validation_field(
            format!("{} cannot contain empty patterns", field),
            field,
        ));
    }
    Ok(())
}
