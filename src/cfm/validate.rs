//! Per-field and cross-field validation (spec §4.5 "Validate", "Cross-field
//! checks"; grounded in `original_source/.../engine/ccm.py`'s
//! `_validate_*` methods).

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use super::{
    fields::{CcmField, FieldType},
    normalize::normalize
};
use crate::ir::Severity;

/// Result of validating one canonical field on one record (spec §4.5).
#[derive(Debug, Clone)]
pub struct FieldValidation {
    pub field:      String,
    pub is_valid:   bool,
    pub severity:   Severity,
    pub message:    Option<String>,
    pub suggestion: Option<String>,
    pub original:   Option<Value>,
    pub normalized: Option<Value>
}

/// A URL is valid iff it has both a scheme and an authority, and the scheme
/// is `http` or `https` (mirrors `urlparse` + scheme/netloc checks).
fn is_valid_url(url: &str) -> bool {
    Regex::new(r"^(https?)://[^\s/$.?#][^\s]*$")
        .unwrap()
        .is_match(url)
}

pub fn validate_field(field: &CcmField, value: Option<&Value>) -> FieldValidation {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return if field.required {
            FieldValidation {
                field: field.name.to_string(),
                is_valid: false,
                severity: Severity::Error,
                message: Some(format!("required field '{}' is missing", field.name)),
                suggestion: None,
                original: None,
                normalized: None
            }
        } else {
            FieldValidation {
                field: field.name.to_string(),
                is_valid: true,
                severity: Severity::Info,
                message: None,
                suggestion: None,
                original: None,
                normalized: None
            }
        };
    };

    let normalized = normalize(field.field_type, value);
    let mut errors: Vec<String> = Vec::new();

    match field.field_type {
        FieldType::String | FieldType::Url => {
            let s = normalized.as_str().unwrap_or_default();
            if let Some(min) = field.min_length
                && s.len() < min
            {
                errors.push(format!("'{}' shorter than minimum length {}", field.name, min));
            }
            if let Some(max) = field.max_length
                && s.len() > max
            {
                errors.push(format!("'{}' longer than maximum length {}", field.name, max));
            }
            if let Some(pattern) = field.pattern
                && let Ok(re) = Regex::new(pattern)
                && !re.is_match(s)
            {
                errors.push(format!("'{}' does not match required pattern", field.name));
            }
            if field.field_type == FieldType::Url && !s.is_empty() && !is_valid_url(s) {
                errors.push(format!("'{}' is not a well-formed URL", field.name));
            }
        }
        FieldType::Integer => {
            if !normalized.is_i64() && !normalized.is_u64() {
                errors.push(format!("'{}' is not a valid integer", field.name));
            } else if field.name == "stock" && normalized.as_i64().is_some_and(|n| n < 0) {
                errors.push("Estoque não pode ser negativo".to_string());
            }
        }
        FieldType::Decimal => {
            if !normalized.is_number() {
                errors.push(format!("'{}' is not a valid decimal", field.name));
            } else if let Some(n) = normalized.as_f64() {
                if field.name == "price_brl" && n <= 0.0 {
                    errors.push("Preço deve ser maior que zero".to_string());
                } else if matches!(field.name, "weight_kg" | "length_cm" | "width_cm" | "height_cm")
                    && n < 0.0
                {
                    errors.push(format!("Dimensão {} não pode ser negativa", field.name));
                }
            }
        }
        FieldType::Boolean => {
            if !normalized.is_boolean() {
                errors.push(format!("'{}' is not a recognized boolean value", field.name));
            }
        }
        FieldType::Array => {
            if !normalized.is_array() {
                errors.push(format!("'{}' is not a valid list", field.name));
            } else if field.name == "images" {
                let invalid_urls: Vec<&str> = normalized
                    .as_array()
                    .unwrap()
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|url| !is_valid_url(url))
                    .take(3)
                    .collect();
                if !invalid_urls.is_empty() {
                    errors.push(format!("URLs inválidas em images: {}", invalid_urls.join(", ")));
                }
            }
        }
        FieldType::Object => {
            if !normalized.is_object() {
                errors.push(format!("'{}' is not well-formed JSON", field.name));
            }
        }
        FieldType::Date => {
            if normalized == *value {
                errors.push(format!("'{}' is not a parseable date", field.name));
            }
        }
        FieldType::Currency => {
            let code = normalized.as_str().unwrap_or_default();
            if let Some(allowed) = field.allowed_values
                && !allowed.contains(&code)
            {
                errors.push(format!("'{}' is not an allowed currency code", field.name));
            }
        }
    }

    if errors.is_empty()
        && let Some(allowed) = field.allowed_values
        && field.field_type == FieldType::String
    {
        let s = normalized.as_str().unwrap_or_default();
        if !allowed.contains(&s) {
            errors.push(format!("'{}' is not one of the allowed values", field.name));
        }
    }

    if errors.is_empty() {
        FieldValidation {
            field: field.name.to_string(),
            is_valid: true,
            severity: Severity::Info,
            message: None,
            suggestion: None,
            original: Some(value.clone()),
            normalized: Some(normalized)
        }
    } else {
        FieldValidation {
            field: field.name.to_string(),
            is_valid: false,
            severity: Severity::Error,
            message: Some(errors.join("; ")),
            suggestion: None,
            original: Some(value.clone()),
            normalized: Some(normalized)
        }
    }
}

/// Dimensions must all be present if any are present (spec §4.5).
pub fn check_dimensions_all_or_none(record: &IndexMap<String, Value>) -> Option<FieldValidation> {
    let dims = ["length_cm", "width_cm", "height_cm"];
    let present: Vec<&str> = dims
        .iter()
        .filter(|d| record.get(**d).is_some_and(|v| !v.is_null()))
        .copied()
        .collect();

    if !present.is_empty() && present.len() != dims.len() {
        Some(FieldValidation {
            field: "dimensions".to_string(),
            is_valid: false,
            severity: Severity::Error,
            message: Some(
                "length_cm, width_cm, and height_cm must all be present if any are present"
                    .to_string()
            ),
            suggestion: None,
            original: None,
            normalized: None
        })
    } else {
        None
    }
}

/// Price in BRL must declare `currency = BRL` if currency is stated
/// (spec §4.5).
pub fn check_price_currency_consistency(
    record: &IndexMap<String, Value>
) -> Option<FieldValidation> {
    let currency = record.get("currency").and_then(Value::as_str);
    let has_price = record.get("price_brl").is_some_and(|v| !v.is_null());

    match currency {
        Some(code) if has_price && !code.eq_ignore_ascii_case("BRL") => Some(FieldValidation {
            field: "currency".to_string(),
            is_valid: false,
            severity: Severity::Error,
            message: Some(format!(
                "price_brl is denominated in BRL but currency is '{}'",
                code
            )),
            suggestion: Some("BRL".to_string()),
            original: Some(Value::String(code.to_string())),
            normalized: None
        }),
        _ => None
    }
}
