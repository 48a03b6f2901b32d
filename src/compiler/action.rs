//! Compiles an [`ActionNode`] into a resolved [`Action`] (spec §4.2 step 5).

use crate::{
    document::ActionNode,
    error::{self, CompilationError},
    ir::{Action, TransformSpec}
};

pub fn compile(rule_id: &str, rule_type: &str, node: &ActionNode) -> Result<Action, CompilationError> {
    match rule_type {
        "assert" => Ok(Action::Assert {
            stop_on_error: node.stop_on_error.unwrap_or(false)
        }),
        "transform" => {
            let operation = node
                .operation
                .clone()
                .ok_or_else(|| error::missing_action_field(rule_id, "operation"))?;
            Ok(Action::Transform(TransformSpec {
                operation,
                value: node.value.clone(),
                params: node.params.clone()
            }))
        }
        "suggest" => {
            if node.suggestions.is_empty() {
                return Err(error::missing_action_field(rule_id, "suggestions"));
            }
            let confidence = node
                .confidence
                .ok_or_else(|| error::missing_action_field(rule_id, "confidence"))?;
            if !(0.0..=1.0).contains(&confidence) {
                return Err(error::condition_tree_invalid(
                    rule_id,
                    format!("suggest.confidence must be in [0,1], got {}", confidence)
                ));
            }
            Ok(Action::Suggest {
                suggestions: node.suggestions.clone(),
                confidence
            })
        }
        other => Err(error::unknown_action_type(rule_id, other))
    }
}
