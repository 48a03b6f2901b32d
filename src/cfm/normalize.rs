//! Per-type normalization (spec §4.5 "Normalize"; behavior grounded in
//! `original_source/.../engine/ccm.py`'s `_normalize_*` methods).

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use super::fields::FieldType;

pub fn normalize(field_type: FieldType, value: &Value) -> Value {
    match field_type {
        FieldType::String => Value::String(as_string(value).trim().to_string()),
        FieldType::Integer => normalize_integer(value),
        FieldType::Decimal => normalize_decimal(value),
        FieldType::Boolean => normalize_boolean(value),
        FieldType::Array => normalize_array(value),
        FieldType::Object => normalize_object(value),
        FieldType::Url => Value::String(normalize_url(&as_string(value))),
        FieldType::Date => normalize_date(value),
        FieldType::Currency => Value::String(as_string(value).trim().to_uppercase())
    }
}

fn as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string()
    }
}

fn normalize_integer(value: &Value) -> Value {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => value.clone(),
        Value::Number(n) => n
            .as_f64()
            .map(|f| Value::from(f.round() as i64))
            .unwrap_or_else(|| value.clone()),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| value.clone()),
        other => other.clone()
    }
}

/// Accepts both `1234.56` and the Brazilian locale's `1.234,56`.
fn normalize_decimal(value: &Value) -> Value {
    let raw = match value {
        Value::Number(_) => return value.clone(),
        Value::String(s) => s.trim().to_string(),
        other => return other.clone()
    };

    let parsed = if raw.contains(',') && raw.contains('.') {
        raw.replace('.', "").replace(',', ".").parse::<f64>()
    } else if raw.contains(',') {
        raw.replace(',', ".").parse::<f64>()
    } else {
        raw.parse::<f64>()
    };

    match parsed {
        Ok(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(value.clone()),
        Err(_) => value.clone()
    }
}

/// Truthy-string parsing including the Portuguese `sim`/`não` the source
/// domain (a Brazilian marketplace) requires.
fn normalize_boolean(value: &Value) -> Value {
    match value {
        Value::Bool(_) => value.clone(),
        Value::String(s) => {
            let lowered = s.trim().to_lowercase();
            match lowered.as_str() {
                "true" | "1" | "yes" | "sim" | "verdadeiro" => Value::Bool(true),
                "false" | "0" | "no" | "não" | "falso" => Value::Bool(false),
                _ => value.clone()
            }
        }
        other => other.clone()
    }
}

fn normalize_array(value: &Value) -> Value {
    match value {
        Value::Array(_) => value.clone(),
        Value::String(s) => Value::Array(
            s.split(',')
                .map(|item| Value::String(item.trim().to_string()))
                .filter(|v| v != &Value::String(String::new()))
                .collect()
        ),
        other => other.clone()
    }
}

fn normalize_object(value: &Value) -> Value {
    match value {
        Value::Object(_) => value.clone(),
        Value::String(s) => serde_json::from_str(s).unwrap_or_else(|_| value.clone()),
        other => other.clone()
    }
}

fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d"];

fn normalize_date(value: &Value) -> Value {
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        other => return other.clone()
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Value::String(dt.to_rfc3339());
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&raw, format) {
            return Value::String(date.format("%Y-%m-%d").to_string());
        }
    }

    value.clone()
}
