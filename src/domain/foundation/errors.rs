//! Domain error types.
//!
//! [`ValidationError`] is raised while building value objects from raw input
//! (survey files, knowledge base metadata). [`DomainError`] is the coarse,
//! coded error that crosses layer boundaries.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// A raw value that could not become a value object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is empty")]
    EmptyField { field: String },

    #[error("{field} = {actual} is outside {min}..={max}")]
    OutOfRange {
        field: String,
        min: i32,
        max: i32,
        actual: i32,
    },

    #[error("{field} is malformed: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("'{value}' is not a known {kind}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        Self::EmptyField { field: field.into() }
    }

    pub fn out_of_range(field: impl Into<String>, min: i32, max: i32, actual: i32) -> Self {
        Self::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_variant(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }

    /// Name of the offending field, or the enumeration kind.
    pub fn field(&self) -> &str {
        match self {
            Self::EmptyField { field }
            | Self::OutOfRange { field, .. }
            | Self::InvalidFormat { field, .. } => field,
            Self::UnknownVariant { kind, .. } => kind,
        }
    }
}

/// Stable, machine-readable failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,
    MissingData,
    CatalogUnavailable,
    ResponsesUnavailable,
    RetrievalFailed,
    StorageError,
    ConfigurationError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::MissingData => "MISSING_DATA",
            Self::CatalogUnavailable => "CATALOG_UNAVAILABLE",
            Self::ResponsesUnavailable => "RESPONSES_UNAVAILABLE",
            Self::RetrievalFailed => "RETRIEVAL_FAILED",
            Self::StorageError => "STORAGE_ERROR",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coded error with a human message and optional key/value context.
#[derive(Debug, Clone, Error)]
#[error("[{code}] {message}")]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: BTreeMap<String, String>,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        DomainError::new(ErrorCode::ValidationFailed, err.to_string()).with_detail("field", field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn likert_range_error_names_bounds_and_value() {
        let err = ValidationError::out_of_range("answer", 1, 5, 7);
        assert_eq!(err.to_string(), "answer = 7 is outside 1..=5");
    }

    #[test]
    fn unknown_dimension_message_quotes_the_value() {
        let err = ValidationError::unknown_variant("dimension", "XYZ");
        assert_eq!(err.to_string(), "'XYZ' is not a known dimension");
        assert_eq!(err.field(), "dimension");
    }

    #[test]
    fn catalog_error_is_prefixed_with_its_code() {
        let err = DomainError::new(ErrorCode::CatalogUnavailable, "items.json not found");
        assert_eq!(err.to_string(), "[CATALOG_UNAVAILABLE] items.json not found");
    }

    #[test]
    fn details_accumulate() {
        let err = DomainError::new(ErrorCode::MissingData, "no answer")
            .with_detail("participant", "7")
            .with_detail("item", "i01");

        assert_eq!(err.detail("participant"), Some("7"));
        assert_eq!(err.detail("item"), Some("i01"));
        assert_eq!(err.detail("dimension"), None);
    }

    #[test]
    fn validation_failure_keeps_the_field_as_detail() {
        let err: DomainError = ValidationError::empty_field("item_code").into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.detail("field"), Some("item_code"));
    }
}
