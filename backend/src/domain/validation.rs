//! Field-level validation results.
//!
//! Draft constructors collect every failure instead of stopping at the first
//! so callers can show the complete list to the user.

use serde::Serialize;
use serde_json::json;

use super::Error;

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Request field the message refers to.
    pub field: &'static str,
    /// Human-readable failure message.
    pub message: String,
}

/// Accumulated validation failures.
///
/// # Examples
/// ```
/// use pointsboard::domain::ValidationErrors;
///
/// let mut errors = ValidationErrors::new();
/// errors.push("name", "name must not be empty");
/// assert!(errors.into_result(()).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Start with no failures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record a failure when `condition` is false.
    pub fn check(&mut self, condition: bool, field: &'static str, message: impl Into<String>) {
        if !condition {
            self.push(field, message);
        }
    }

    /// Whether any failure was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recorded failures.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Messages only, in insertion order.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.message.as_str()).collect()
    }

    /// Merge another set of failures into this one.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// `Ok(value)` when no failure was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        let message = value
            .0
            .first()
            .map_or_else(|| "validation failed".to_owned(), |e| e.message.clone());
        Self::invalid_request(message).with_details(json!({ "errors": value.0 }))
    }
}
