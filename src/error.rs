//! Error types and constructors for the rule engine.
//!
//! This module provides error construction functions that create properly
//! formatted [`AppError`] instances and [`CompilationError`] values with
//! context-specific messages.
//!
//! # Error Categories
//!
//! - **Compile-time errors**: schema violations, duplicate/invalid rule ids,
//!   unknown operators/actions, invalid regexes, unknown CCM fields.
//! - **Config errors**: invalid configuration files or values.
//! - **File errors**: IO failures when reading rule documents or tables.

pub use masterror::{AppError, AppResult};

/// A compile-time failure, localized to the offending rule when known.
///
/// Mirrors spec.md §4.2/§7: any malformed rule aborts compilation with the
/// offending rule id; no partial `CompiledRuleSet` is ever produced.
#[derive(Debug, Clone)]
pub struct CompilationError {
    pub message: String,
    pub rule_id: Option<String>,
    pub line:    Option<usize>
}

impl CompilationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            rule_id: None,
            line:    None
        }
    }

    pub fn with_rule(message: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            rule_id: Some(rule_id.into()),
            line:    None
        }
    }
}

impl std::fmt::Display for CompilationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.rule_id {
            Some(id) => write!(f, "rule '{}': {}", id, self.message),
            None => write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for CompilationError {}

impl From<CompilationError> for AppError {
    fn from(err: CompilationError) -> Self {
        AppError::bad_request(err.to_string())
    }
}

/// Create a document-parse error (malformed YAML/JSON rule document).
pub fn document_parse_error(message: impl Into<String>) -> CompilationError {
    CompilationError::new(format!("document parse error: {}", message.into()))
}

/// Create a schema-violation error.
pub fn schema_violation(message: impl Into<String>) -> CompilationError {
    CompilationError::new(format!("schema violation: {}", message.into()))
}

/// Create a duplicate-rule-id error.
pub fn duplicate_rule_id(rule_id: &str) -> CompilationError {
    CompilationError::with_rule("duplicate rule id", rule_id)
}

/// Create an invalid-rule-id error.
pub fn invalid_rule_id(rule_id: &str) -> CompilationError {
    CompilationError::with_rule("rule id must match ^[a-z][a-z0-9_]{2,63}$", rule_id)
}

/// Create an unknown-operator error localized to a rule.
pub fn unknown_operator(rule_id: &str, operator: &str) -> CompilationError {
    CompilationError::with_rule(format!("unknown condition operator '{}'", operator), rule_id)
}

/// Create an unknown-action-type error localized to a rule.
pub fn unknown_action_type(rule_id: &str, action_type: &str) -> CompilationError {
    CompilationError::with_rule(format!("unknown action type '{}'", action_type), rule_id)
}

/// Create an invalid-regex error localized to a rule.
pub fn invalid_regex(rule_id: &str, pattern: &str, source: &regex::Error) -> CompilationError {
    CompilationError::with_rule(format!("invalid regex '{}': {}", pattern, source), rule_id)
}

/// Create a missing-action-field error localized to a rule.
pub fn missing_action_field(rule_id: &str, field: &str) -> CompilationError {
    CompilationError::with_rule(format!("action missing required field '{}'", field), rule_id)
}

/// Create a condition-tree-invalid error localized to a rule.
pub fn condition_tree_invalid(rule_id: &str, message: impl Into<String>) -> CompilationError {
    CompilationError::with_rule(message.into(), rule_id)
}

/// Create an unknown-CCM-field error for a `ccm_mapping` entry.
pub fn ccm_mapping_unknown_field(field: &str) -> CompilationError {
    CompilationError::new(format!(
        "ccm_mapping references unknown canonical field '{}'",
        field
    ))
}

/// Create a config error (invalid config file or value).
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Create a file-read error with path context.
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("failed to read file '{}': {}", path, source))
}
