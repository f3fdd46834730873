//! Error types for the domain layer.

use std::error::Error;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }
}

/// The rule a field violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolatedRule {
    /// The field was absent (null).
    Required,
    /// The field was empty or whitespace only.
    NotBlank,
}

impl fmt::Display for ViolatedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViolatedRule::Required => "REQUIRED",
            ViolatedRule::NotBlank => "NOT_BLANK",
        };
        write!(f, "{}", s)
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Path of the offending field, e.g. `contacts[0].code`.
    pub field: String,
    pub rule: ViolatedRule,
    pub message: String,
}

impl FieldViolation {
    pub fn required(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: ViolatedRule::Required,
            message: "must not be null".to_string(),
        }
    }

    pub fn not_blank(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: ViolatedRule::NotBlank,
            message: "must not be blank".to_string(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Infrastructure errors
    DatabaseError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and field violations.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    /// Field-level failures; populated for `ValidationFailed`.
    pub violations: Vec<FieldViolation>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            violations: Vec::new(),
        }
    }

    /// Creates a validation error carrying every violation found.
    pub fn invalid(violations: Vec<FieldViolation>) -> Self {
        let message = match violations.len() {
            1 => format!("Validation failed: {}", violations[0]),
            n => format!("Validation failed with {} violations", n),
        };
        Self {
            violations,
            ..Self::new(ErrorCode::ValidationFailed, message)
        }
    }

    /// Creates a database error, keeping the driver message for logs.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}
