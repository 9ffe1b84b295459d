//! Composable validation rules built on the `validator` crate's error types.
//!
//! Payload types implement [`validator::Validate`] by hand, calling the rule
//! functions below against a shared [`ValidationErrors`]. Every rule records
//! its violation and returns, so a single pass reports every problem at once.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

/// Record `message` under `field` when `value` is absent or blank.
pub fn required(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
    message: &'static str,
) {
    if value.map_or(true, |v| v.trim().is_empty()) {
        errors.add(field, violation("required", message));
    }
}

/// Record `message` under `field` when `value` holds more than `max` characters.
///
/// An absent value passes; pair with [`required`] when presence matters.
pub fn max_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
    max: usize,
    message: &'static str,
) {
    if value.is_some_and(|v| v.chars().count() > max) {
        errors.add(field, violation("length", message));
    }
}

/// Record `message` under `field` when both sides are equal.
///
/// Comparison is exact; two absent values count as equal.
pub fn must_differ(
    errors: &mut ValidationErrors,
    field: &'static str,
    left: Option<&str>,
    right: Option<&str>,
    message: &'static str,
) {
    if left == right {
        errors.add(field, violation("must_differ", message));
    }
}

/// Finish a validation pass.
pub fn finish(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn violation(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Flattened, field-keyed violation messages as they appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Merge `other` with every key prefixed, e.g. `courses[0].` + `title`.
    pub fn extend_prefixed(&mut self, prefix: &str, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0
                .entry(format!("{prefix}{field}"))
                .or_default()
                .extend(messages);
        }
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut flat = FieldErrors::new();
        for (field, violations) in errors.field_errors() {
            for violation in violations {
                let message = violation
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| violation.code.to_string());
                flat.insert(field.to_string(), message);
            }
        }
        flat
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        FieldErrors::from(&errors)
    }
}
