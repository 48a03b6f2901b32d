//! Transform kernels (spec §3 "Action node", §4.3.3, §9 "Transform
//! kernels' exact argument semantics... under-specified in the source;
//! implementers should document each kernel's arguments and defaults
//! explicitly"). Kernel arguments and defaults, as implemented here:
//!
//! - `trim` — no arguments; trims leading/trailing whitespace.
//! - `upper` / `lower` — no arguments; ASCII-aware case folding via
//!   `str::to_uppercase`/`to_lowercase` (Unicode-correct, not ASCII-only).
//! - `title_case` — no arguments; capitalizes the first letter of each
//!   whitespace-separated word, lowercases the rest.
//! - `clean_price` — no arguments; strips currency symbols/whitespace,
//!   accepts both `1.234,56` (BRL) and `1234.56` decimal notation, emits
//!   a plain `1234.56`-style string.
//! - `clean_upc` — no arguments; strips every non-digit character.
//! - `regex_replace` — `params.pattern` (required), `params.replacement`
//!   (default `""`); no-op if `pattern` is absent or fails to compile.
//! - `format` — `value` (template string, default `"{value}"`); `{value}`
//!   is replaced with the trimmed input.
//!
//! Unrecognized operation names are no-ops (spec §4.3.3); the caller
//! records a stats warning.

use regex::Regex;

use crate::ir::TransformSpec;

/// Apply one transform kernel to a single cell's string value.
///
/// Returns `Ok(new_value)` for a recognized operation (which may equal
/// `input` if the transform is a no-op on this particular value — the
/// caller decides whether to emit a `RuleTransformation` by comparing
/// `new_value != input`), or `Err(())` for an unrecognized operation name.
pub fn apply(spec: &TransformSpec, input: &str) -> Result<String, ()> {
    match spec.operation.as_str() {
        "trim" => Ok(input.trim().to_string()),
        "upper" => Ok(input.to_uppercase()),
        "lower" => Ok(input.to_lowercase()),
        "title_case" => Ok(title_case(input)),
        "clean_price" => Ok(clean_price(input)),
        "clean_upc" => Ok(clean_upc(input)),
        "regex_replace" => Ok(regex_replace(spec, input)),
        "format" => Ok(format_value(spec, input)),
        _ => Err(())
    }
}

fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn clean_price(input: &str) -> String {
    let stripped: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = if stripped.contains(',') && stripped.contains('.') {
        stripped.replace('.', "").replace(',', ".")
    } else if stripped.contains(',') {
        stripped.replace(',', ".")
    } else {
        stripped
    };

    match normalized.parse::<f64>() {
        Ok(value) => format!("{:.2}", value),
        Err(_) => normalized
    }
}

fn clean_upc(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

fn regex_replace(spec: &TransformSpec, input: &str) -> String {
    let Some(pattern) = spec.params.get("pattern").and_then(|v| v.as_str()) else {
        return input.to_string();
    };
    let replacement = spec
        .params
        .get("replacement")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    match Regex::new(pattern) {
        Ok(re) => re.replace_all(input, replacement).to_string(),
        Err(_) => input.to_string()
    }
}

fn format_value(spec: &TransformSpec, input: &str) -> String {
    let template = spec.value.as_ref().and_then(|v| v.as_str()).unwrap_or("{value}");
    template.replace("{value}", input.trim())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn spec(operation: &str) -> TransformSpec {
        TransformSpec { operation: operation.to_string(), value: None, params: HashMap::new() }
    }

    #[test]
    fn trim_removes_surrounding_whitespace() {
        assert_eq!(apply(&spec("trim"), "  hello  ").unwrap(), "hello");
    }

    #[test]
    fn trim_is_idempotent() {
        let once = apply(&spec("trim"), "  hello  ").unwrap();
        let twice = apply(&spec("trim"), &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn title_case_capitalizes_each_word() {
        assert_eq!(apply(&spec("title_case"), "hello world").unwrap(), "Hello World");
    }

    #[test]
    fn clean_price_handles_brl_locale() {
        assert_eq!(apply(&spec("clean_price"), "R$ 1.234,56").unwrap(), "1234.56");
    }

    #[test]
    fn clean_upc_strips_non_digits() {
        assert_eq!(apply(&spec("clean_upc"), "789-1234-5").unwrap(), "78912345");
    }

    #[test]
    fn unknown_operation_is_an_error() {
        assert!(apply(&spec("nonexistent"), "x").is_err());
    }

    #[test]
    fn format_substitutes_value_placeholder() {
        let mut s = spec("format");
        s.value = Some(serde_json::json!("R$ {value}"));
        assert_eq!(apply(&s, "10.0").unwrap(), "R$ 10.0");
    }
}
