//! Validation schema for the bookable "service" form.
//!
//! [`validate`] works on the raw, untyped submission so that a wrong-typed
//! field is reported like any other rule violation. Every rule runs; the
//! caller always gets the complete, ordered list of field errors.

mod number;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

pub use number::parse_decimal;

pub const NAME_MIN_CHARS: usize = 2;
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DEPOSIT_MIN: f64 = 0.0;
pub const DEPOSIT_MAX: f64 = 100.0;

pub const NAME_MESSAGE: &str = "Name must be at least 2 characters";
pub const DESCRIPTION_MESSAGE: &str = "Description must be at least 10 characters";
pub const PRICE_MESSAGE: &str = "Price must be a positive number";
pub const IMAGE_MESSAGE: &str = "Must be a valid URL";
pub const IS_BOOKABLE_MESSAGE: &str = "Expected boolean";
pub const DEPOSIT_MESSAGE: &str = "Deposit percentage must be between 0 and 100";

/// Form values as submitted. Numbers stay strings; validation only checks that
/// they parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFormValues {
    pub name: String,
    pub description: String,
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub is_bookable: bool,
    pub deposit_percentage: String,
}

/// One rule violation, keyed by the wire name of the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self { field: field.to_string(), message: message.to_string() }
    }
}

/// Accepted form plus the numbers the rules proved parseable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedService {
    pub values: ServiceFormValues,
    pub price_value: f64,
    pub deposit_value: f64,
}

impl ServiceFormValues {
    /// Run the schema on an already-typed value.
    pub fn validate(&self) -> Result<ValidatedService, Vec<FieldError>> {
        let raw = serde_json::to_value(self).unwrap_or(Value::Null);
        validate(&raw)
    }
}

/// Validate a raw submission. A non-object input fails every required field.
pub fn validate(raw: &Value) -> Result<ValidatedService, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = text_min_chars(raw, "name", NAME_MIN_CHARS, NAME_MESSAGE, &mut errors);
    let description = text_min_chars(raw, "description", DESCRIPTION_MIN_CHARS, DESCRIPTION_MESSAGE, &mut errors);
    let price = number_where(raw, "price", |v| v > 0.0, PRICE_MESSAGE, &mut errors);
    let image = optional_url(raw, "image", &mut errors);
    let is_bookable = boolean(raw, "isBookable", &mut errors);
    let deposit = number_where(
        raw,
        "depositPercentage",
        |v| (DEPOSIT_MIN..=DEPOSIT_MAX).contains(&v),
        DEPOSIT_MESSAGE,
        &mut errors,
    );

    match (name, description, price, image, is_bookable, deposit) {
        (
            Some(name),
            Some(description),
            Some((price, price_value)),
            Some(image),
            Some(is_bookable),
            Some((deposit_percentage, deposit_value)),
        ) if errors.is_empty() => Ok(ValidatedService {
            values: ServiceFormValues { name, description, price, image, is_bookable, deposit_percentage },
            price_value,
            deposit_value,
        }),
        _ => Err(errors),
    }
}

fn text_min_chars(raw: &Value, field: &str, min: usize, message: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    match raw.get(field).and_then(Value::as_str) {
        Some(s) if s.chars().count() >= min => Some(s.to_string()),
        _ => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

fn number_where(
    raw: &Value,
    field: &str,
    accept: impl Fn(f64) -> bool,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<(String, f64)> {
    let parsed = raw
        .get(field)
        .and_then(Value::as_str)
        .and_then(|s| parse_decimal(s).map(|v| (s.to_string(), v)));
    match parsed {
        Some((s, v)) if accept(v) => Some((s, v)),
        _ => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

/// Absent, `null` and `""` all mean "no image".
fn optional_url(raw: &Value, field: &str, errors: &mut Vec<FieldError>) -> Option<Option<String>> {
    match raw.get(field) {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(s)) if s.is_empty() => Some(None),
        Some(Value::String(s)) if Url::parse(s).is_ok() => Some(Some(s.clone())),
        Some(_) => {
            errors.push(FieldError::new(field, IMAGE_MESSAGE));
            None
        }
    }
}

fn boolean(raw: &Value, field: &str, errors: &mut Vec<FieldError>) -> Option<bool> {
    let value = raw.get(field).and_then(Value::as_bool);
    if value.is_none() {
        errors.push(FieldError::new(field, IS_BOOKABLE_MESSAGE));
    }
    value
}
