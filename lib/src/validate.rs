//! Boundary checks run before any value reaches the estimators.
//!
//! The string parsers are meant for user input (they plug straight into a
//! `clap` value parser); the `check_*` helpers guard the estimators
//! themselves.

use crate::error::DomainError;

/// Parses a strictly positive, finite real number
pub fn positive_float(name: &'static str, input: &str) -> Result<f64, DomainError> {
    check_positive(name, parse_float(name, input)?)
}

/// Parses a finite real number that is zero or greater
pub fn non_negative_float(name: &'static str, input: &str) -> Result<f64, DomainError> {
    check_non_negative(name, parse_float(name, input)?)
}

/// Parses a block height
pub fn block_height(input: &str) -> Result<u64, DomainError> {
    let input = input.trim();
    if let Ok(height) = input.parse::<u64>() {
        return Ok(height);
    }
    match input.parse::<i64>() {
        Ok(value) if value < 0 => Err(DomainError::Negative {
            name: "block height",
            value: value as f64,
        }),
        _ => Err(DomainError::NotANumber {
            name: "block height",
            input: input.to_string(),
        }),
    }
}

pub fn check_positive(name: &'static str, value: f64) -> Result<f64, DomainError> {
    let value = check_finite(name, value)?;
    if value <= 0.0 {
        return Err(DomainError::NotPositive { name, value });
    }
    Ok(value)
}

pub fn check_non_negative(name: &'static str, value: f64) -> Result<f64, DomainError> {
    let value = check_finite(name, value)?;
    if value < 0.0 {
        return Err(DomainError::Negative { name, value });
    }
    Ok(value)
}

fn check_finite(name: &'static str, value: f64) -> Result<f64, DomainError> {
    if !value.is_finite() {
        return Err(DomainError::NotFinite { name, value });
    }
    Ok(value)
}

fn parse_float(name: &'static str, input: &str) -> Result<f64, DomainError> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|_| DomainError::NotANumber {
            name,
            input: input.to_string(),
        })
}
