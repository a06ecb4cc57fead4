//! Request field validation
//!
//! `check_fields` sanitizes a flat set of required and optional fields out of an
//! untyped JSON object. Every endpoint runs it before touching storage.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use validator::ValidateEmail;

// ============================================================================
// Validation Errors
// ============================================================================

/// Required fields that were absent or blank, in encounter order
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Fields {} are missing", .0.join(", "))]
pub struct MissingFields(pub Vec<String>);

/// Outcome of [`check_fields`]
pub type ValidationResult = Result<SanitizedFields, MissingFields>;

// ============================================================================
// SanitizedFields
// ============================================================================

/// Field values that passed validation, keyed by field name.
///
/// Values are kept exactly as submitted (not trimmed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedFields(BTreeMap<String, String>);

impl SanitizedFields {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Remove and return a field, empty string if it was not collected
    pub fn take(&mut self, key: &str) -> String {
        self.0.remove(key).unwrap_or_default()
    }

    /// Remove an optional field, `None` if absent or blank
    pub fn take_non_blank(&mut self, key: &str) -> Option<String> {
        self.0.remove(key).filter(|v| !v.trim().is_empty())
    }
}

// ============================================================================
// Field Check
// ============================================================================

/// Validate required fields and collect required + optional ones.
///
/// Keys are visited required first, then optional, in caller order. A key named
/// in both lists is treated as required. Absent and `null` values read as the
/// empty string; other scalars are rendered to text.
pub fn check_fields(
    required: &[&str],
    optional: &[&str],
    input: &Map<String, Value>,
) -> ValidationResult {
    let mut sanitized: BTreeMap<String, String> = BTreeMap::new();
    let mut missing: Vec<String> = Vec::new();

    let optional_only = optional.iter().filter(|key| !required.contains(*key));

    for (key, is_required) in required
        .iter()
        .map(|k| (k, true))
        .chain(optional_only.map(|k| (k, false)))
    {
        if sanitized.contains_key(*key) || missing.iter().any(|m| m == *key) {
            continue;
        }

        let value = input.get(*key).map(render_value).unwrap_or_default();

        if is_required && value.trim().is_empty() {
            missing.push(key.to_string());
        } else {
            sanitized.insert(key.to_string(), value);
        }
    }

    if missing.is_empty() {
        Ok(SanitizedFields(sanitized))
    } else {
        Err(MissingFields(missing))
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Field Format Checks
// ============================================================================

/// RFC-5322-ish email check (via the `validator` crate)
pub fn validate_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// True when `value` fits a column of `max` characters
pub fn within_length(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

/// Signup precondition: both password entries must be identical
pub fn passwords_match(password: &str, confirm_password: &str) -> bool {
    password == confirm_password
}
