//! Required-field checks applied to admin form submissions.
//!
//! The database enforces referential integrity; these helpers only catch
//! what a form can get wrong before the row ever reaches it.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }

    #[must_use]
    pub fn required(field: &'static str) -> Self {
        Self::new(field, format!("{field} is required"))
    }
}

/// Trimmed, non-empty text or a "required" error.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming `field` when the value is absent or blank.
pub fn required_text(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    optional_text(value).ok_or_else(|| ValidationError::required(field))
}

/// Trimmed text, with blank input collapsed to `None`.
#[must_use]
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Unwrap a required non-text field.
///
/// # Errors
///
/// Returns a "required" [`ValidationError`] when `value` is `None`.
pub fn required<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::required(field))
}

/// # Errors
///
/// Returns a [`ValidationError`] when `value` is below zero.
pub fn non_negative(field: &'static str, value: Option<i32>) -> Result<Option<i32>, ValidationError> {
    match value {
        Some(v) if v < 0 => Err(ValidationError::new(field, format!("{field} must not be negative"))),
        other => Ok(other),
    }
}

/// # Errors
///
/// Returns a [`ValidationError`] when `value` is below one.
pub fn positive(field: &'static str, value: Option<i32>) -> Result<Option<i32>, ValidationError> {
    match value {
        Some(v) if v < 1 => Err(ValidationError::new(field, format!("{field} must be at least 1"))),
        other => Ok(other),
    }
}

/// Merge a PATCH field into the stored value. Absent keeps, present replaces.
pub fn merge<T>(current: T, patch: Option<T>) -> T {
    patch.unwrap_or(current)
}

/// Deserialize a nullable PATCH field so that an explicit `null` becomes
/// `Some(None)` (clear) while a missing key stays `None` (keep). Pair with
/// `#[serde(default)]`.
///
/// # Errors
///
/// Propagates the inner deserializer error.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
