//! Field-level input checks for everything that arrives loosely typed.
//!
//! Checks collect every failing field instead of stopping at the first one, so a
//! caller can report all problems in one response.

pub mod campaign;
pub mod customer;

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::store_precision;

pub use campaign::CampaignInput;
pub use customer::CustomerInput;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError { field: field.to_string(), message: message.into() });
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    /// Appends errors for fields not already reported.
    pub fn absorb(&mut self, other: ValidationErrors) {
        for error in other.0 {
            if !self.has_field(&error.field) {
                self.0.push(error);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.0
    }

    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&rendered)
    }
}

impl std::error::Error for ValidationErrors {}

/// Parses a decimal integer, rejecting blanks, fractions and anything above `i64::MAX`.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// Accepts JSON numbers and numeric strings, the way form posts tend to send them.
pub fn integer_from_json(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(raw) => parse_integer(raw),
        _ => None,
    }
}

pub fn non_negative(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` (read as UTC) and plain
/// `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(store_precision(parsed.with_timezone(&Utc)));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(store_precision(parsed.and_utc()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

pub fn looks_like_email(raw: &str) -> bool {
    if raw.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return false;
    }

    labels
        .iter()
        .all(|label| label.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-'))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::{integer_from_json, looks_like_email, parse_date, parse_integer, ValidationErrors};

    #[test]
    fn zero_parses_as_a_real_integer() {
        assert_eq!(parse_integer("0"), Some(0));
        assert_eq!(integer_from_json(&json!(0)), Some(0));
        assert_eq!(integer_from_json(&json!("0")), Some(0));
    }

    #[test]
    fn blanks_and_fractions_are_not_integers() {
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer("  "), None);
        assert_eq!(parse_integer("2.5"), None);
        assert_eq!(integer_from_json(&json!(2.5)), None);
        assert_eq!(integer_from_json(&json!(true)), None);
        assert_eq!(integer_from_json(&json!(u64::MAX)), None);
    }

    #[test]
    fn dates_accept_plain_and_rfc3339_forms() {
        let midnight = Utc.with_ymd_and_hms(2024, 5, 17, 0, 0, 0).single().expect("date");
        assert_eq!(parse_date("2024-05-17"), Some(midnight));
        assert_eq!(parse_date("2024-05-17T00:00:00Z"), Some(midnight));
        assert_eq!(parse_date("2024-05-17T05:30:00+05:30"), Some(midnight));
        assert_eq!(parse_date("2024-05-17T00:00:00"), Some(midnight));
        assert_eq!(parse_date("17/05/2024"), None);
        assert_eq!(parse_date("2024-02-30"), None);
    }

    #[test]
    fn email_shape_checks() {
        assert!(looks_like_email("asha@example.com"));
        assert!(looks_like_email("first.last+tag@mail.example.co"));
        assert!(!looks_like_email("asha@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("asha@@example.com"));
        assert!(!looks_like_email("asha @example.com"));
        assert!(!looks_like_email("asha@example..com"));
    }

    #[test]
    fn absorb_skips_fields_already_reported() {
        let mut errors = ValidationErrors::single("size", "Size must be a positive number.");
        let mut other = ValidationErrors::single("size", "duplicate");
        other.push("message", "Message is required.");

        errors.absorb(other);

        assert_eq!(errors.errors().len(), 2);
        assert_eq!(errors.errors()[0].message, "Size must be a positive number.");
        assert_eq!(
            errors.to_string(),
            "size: Size must be a positive number.; message: Message is required."
        );
    }
}
