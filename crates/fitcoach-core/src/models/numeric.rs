// ABOUTME: Lenient numeric field parsing for client-submitted documents
// ABOUTME: Accepts JSON numbers or numeric strings and reports failures with a field path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// A numeric value as submitted by the trainer app.
///
/// The apps send numbers either as JSON numbers or as the text typed into a
/// form field, so both are accepted and normalized during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    /// JSON integer
    Integer(i64),
    /// JSON number with a fractional representation
    Float(f64),
    /// Text form input
    Text(String),
}

/// 2^63, the first float past the `i64` range
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

impl NumericField {
    /// Parse as a whole number.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] at `path` when the value is not a whole number
    pub fn to_integer(&self, path: &str) -> Result<i64, ValidationError> {
        match self {
            Self::Integer(value) => Ok(*value),
            Self::Float(value) => {
                if value.fract() == 0.0 && (-I64_LIMIT..I64_LIMIT).contains(value) {
                    Ok(*value as i64)
                } else {
                    Err(ValidationError::malformed_number(path, self))
                }
            }
            Self::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| ValidationError::malformed_number(path, self)),
        }
    }

    /// Render as text, used for free-form fields like rep ranges.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(text) => text.trim().to_owned(),
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "\"{text}\""),
        }
    }
}

/// What was wrong with a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationProblem {
    /// Required text was empty
    Empty,
    /// Not a whole number
    MalformedNumber(String),
    /// Number outside the accepted range
    OutOfRange(String),
    /// Not a valid identifier
    InvalidIdentifier(String),
    /// Any other rule
    Invalid(String),
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "must not be empty"),
            Self::MalformedNumber(value) => write!(f, "{value} is not a whole number"),
            Self::OutOfRange(rule) => write!(f, "{rule}"),
            Self::InvalidIdentifier(value) => write!(f, "\"{value}\" is not a valid identifier"),
            Self::Invalid(reason) => write!(f, "{reason}"),
        }
    }
}

/// A field-level validation failure, raised before anything is written
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {problem}")]
pub struct ValidationError {
    /// Location of the field in the document, e.g. `days[1].exercises[0].sets`
    pub path: String,
    /// What was wrong
    pub problem: ValidationProblem,
}

impl ValidationError {
    /// Build an error for `path`
    pub fn new(path: impl Into<String>, problem: ValidationProblem) -> Self {
        Self {
            path: path.into(),
            problem,
        }
    }

    /// Required field was empty
    pub fn empty(path: impl Into<String>) -> Self {
        Self::new(path, ValidationProblem::Empty)
    }

    fn malformed_number(path: &str, value: &NumericField) -> Self {
        Self::new(path, ValidationProblem::MalformedNumber(value.to_string()))
    }

    /// Number outside the accepted range
    pub fn out_of_range(path: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::new(path, ValidationProblem::OutOfRange(rule.into()))
    }

    /// Other rule violation
    pub fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(path, ValidationProblem::Invalid(reason.into()))
    }
}

/// Trim a required text field, rejecting blanks
///
/// # Errors
///
/// Returns a [`ValidationError`] when the text is blank
pub fn required_text(value: &str, path: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty(path));
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional text field, mapping blanks to `None`
#[must_use]
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

/// Parse an identifier field as a UUID, returning its canonical text form
///
/// # Errors
///
/// Returns a [`ValidationError`] when the value is blank or not a UUID
pub fn identifier(value: &str, path: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty(path));
    }
    Uuid::parse_str(trimmed).map(|id| id.to_string()).map_err(|_| {
        ValidationError::new(
            path,
            ValidationProblem::InvalidIdentifier(trimmed.to_owned()),
        )
    })
}

/// Canonical text of an id used for lookups
///
/// UUIDs in any accepted spelling (upper case, braced, hyphenless) map to the
/// stored lower-case hyphenated form. Anything else is returned trimmed and
/// will simply match no row.
#[must_use]
pub fn lookup_id(value: &str) -> String {
    let trimmed = value.trim();
    Uuid::parse_str(trimmed).map_or_else(|_| trimmed.to_owned(), |id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_forms_are_accepted() {
        assert_eq!(NumericField::Integer(3).to_integer("sets"), Ok(3));
        assert_eq!(NumericField::Float(4.0).to_integer("sets"), Ok(4));
        assert_eq!(NumericField::Text(" 12 ".into()).to_integer("sets"), Ok(12));
        assert_eq!(NumericField::Text("-2".into()).to_integer("order"), Ok(-2));
    }

    #[test]
    fn test_malformed_numbers_are_rejected() {
        let err = NumericField::Text("three".into())
            .to_integer("days[0].exercises[1].sets")
            .unwrap_err();
        assert_eq!(err.path, "days[0].exercises[1].sets");
        assert!(matches!(err.problem, ValidationProblem::MalformedNumber(_)));

        assert!(NumericField::Float(2.5).to_integer("sets").is_err());
        assert!(NumericField::Float(f64::NAN).to_integer("sets").is_err());
        assert!(NumericField::Float(1e30).to_integer("sets").is_err());
        assert!(NumericField::Float(-1e19).to_integer("sets").is_err());
        assert!(NumericField::Float(I64_LIMIT).to_integer("sets").is_err());
        assert!(NumericField::Float(f64::INFINITY).to_integer("sets").is_err());
        assert_eq!(NumericField::Float(-I64_LIMIT).to_integer("order"), Ok(i64::MIN));
        assert!(NumericField::Text(String::new()).to_integer("sets").is_err());
    }

    #[test]
    fn test_untagged_deserialization() {
        let values: Vec<NumericField> = serde_json::from_str(r#"[3, 2.5, "8-12"]"#).unwrap();
        assert_eq!(values[0], NumericField::Integer(3));
        assert_eq!(values[1], NumericField::Float(2.5));
        assert_eq!(values[2], NumericField::Text("8-12".into()));
        assert_eq!(values[2].to_text(), "8-12");
        assert_eq!(values[0].to_text(), "3");
    }

    #[test]
    fn test_identifier_validation() {
        let id = uuid::Uuid::new_v4().to_string();
        assert_eq!(identifier(&format!(" {id} "), "client_id"), Ok(id));
        let err = identifier("42", "client_id").unwrap_err();
        assert_eq!(err.to_string(), "client_id: \"42\" is not a valid identifier");
        assert_eq!(
            identifier("  ", "client_id").unwrap_err().problem,
            ValidationProblem::Empty
        );
    }

    #[test]
    fn test_lookup_id_canonicalizes_uuid_spellings() {
        let id = uuid::Uuid::new_v4();
        let canonical = id.to_string();
        assert_eq!(lookup_id(&canonical.to_uppercase()), canonical);
        assert_eq!(lookup_id(&format!("{{{id}}}")), canonical);
        assert_eq!(lookup_id(&id.simple().to_string()), canonical);
        assert_eq!(lookup_id(" not-an-id "), "not-an-id");
    }
}
