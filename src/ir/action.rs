//! Compiled action nodes (spec §3 "Action node", §4.3.3).

use std::collections::HashMap;

use serde_json::Value;

/// A resolved `transform` action's kernel invocation.
#[derive(Debug, Clone)]
pub struct TransformSpec {
    /// Name of the transform kernel (`trim`, `upper`, `clean_price`, …).
    pub operation: String,
    pub value:     Option<Value>,
    pub params:    HashMap<String, Value>
}

/// A compiled action, resolved by `type` (spec §3 "Action node").
#[derive(Debug, Clone)]
pub enum Action {
    Assert {
        stop_on_error: bool
    },
    Transform(TransformSpec),
    Suggest {
        suggestions: Vec<String>,
        confidence:  f64
    }
}

impl Action {
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::Assert { .. } => "assert",
            Action::Transform(_) => "transform",
            Action::Suggest { .. } => "suggest"
        }
    }
}
