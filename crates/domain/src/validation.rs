//! Field validation for request schemas.
//!
//! Request schemas deserialize with every field optional so that a missing
//! field is reported by name instead of failing the whole body.

use common::WorkerId;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// A request that failed validation, listing every failing field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {}", describe(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    /// Returns true if the named field is among the failures.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

fn describe(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{} {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collects field failures while a request is converted.
///
/// Checks return a placeholder on failure so conversion can continue and
/// report every bad field; the placeholder is discarded by [`finish`].
///
/// [`finish`]: Validator::finish
#[derive(Debug, Default)]
pub(crate) struct Validator {
    fields: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// A required, non-blank string.
    pub fn required_text(&mut self, field: &str, value: Option<String>) -> String {
        match value {
            None => {
                self.reject(field, "is required");
                String::new()
            }
            Some(text) => self.non_blank(field, text),
        }
    }

    /// An optional string that must not be blank when present.
    pub fn optional_text(&mut self, field: &str, value: Option<String>) -> Option<String> {
        value.map(|text| self.non_blank(field, text))
    }

    fn non_blank(&mut self, field: &str, text: String) -> String {
        if text.trim().is_empty() {
            self.reject(field, "must not be empty");
        }
        text
    }

    /// A required order total.
    pub fn required_price(&mut self, field: &str, value: Option<NumberInput>) -> f64 {
        match value {
            None => {
                self.reject(field, "is required");
                0.0
            }
            Some(price) => self.price(field, price),
        }
    }

    /// An optional order total.
    pub fn optional_price(&mut self, field: &str, value: Option<NumberInput>) -> Option<f64> {
        value.map(|price| self.price(field, price))
    }

    fn price(&mut self, field: &str, input: NumberInput) -> f64 {
        let price = match input {
            NumberInput::Number(n) => n,
            NumberInput::Text(text) => match text.trim().parse::<f64>() {
                Ok(n) => n,
                Err(_) => {
                    self.reject(field, "must be a number");
                    return 0.0;
                }
            },
        };
        if !price.is_finite() || price < 0.0 {
            self.reject(field, "must be a number greater than or equal to 0");
        }
        price
    }

    /// An optional worker reference given as text.
    pub fn worker_ref(&mut self, field: &str, value: Option<String>) -> Option<WorkerId> {
        let text = value?;
        match WorkerId::parse(&text) {
            Ok(id) => Some(id),
            Err(_) => {
                self.reject(field, "is not a valid worker id");
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                fields: self.fields,
            })
        }
    }
}

/// A numeric field as sent by a client.
///
/// Form-driven clients send numbers as text; anything that is not a JSON
/// number is kept as text and checked by the [`Validator`].
#[derive(Debug, Clone, PartialEq)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl From<f64> for NumberInput {
    fn from(n: f64) -> Self {
        NumberInput::Number(n)
    }
}

impl From<&str> for NumberInput {
    fn from(text: &str) -> Self {
        NumberInput::Text(text.to_string())
    }
}

/// Deserializes a number that clients may also send as text.
pub(crate) fn number_or_text<'de, D>(deserializer: D) -> Result<Option<NumberInput>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => Some(match n.as_f64() {
            Some(f) => NumberInput::Number(f),
            None => NumberInput::Text(n.to_string()),
        }),
        Some(Value::String(s)) => Some(NumberInput::Text(s)),
        Some(other) => Some(NumberInput::Text(other.to_string())),
    })
}

/// Deserializes a field that distinguishes "absent" from `null`.
///
/// Use with `#[serde(default, deserialize_with = "nullable")]`: an absent
/// field stays `None`, `null` becomes `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Deserializes free-form text that clients may also send as a JSON number.
pub(crate) fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}
