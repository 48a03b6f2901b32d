//! Compiles a [`ConditionNode`] into a resolved [`Condition`] (spec §4.2
//! step 5): regexes compiled, `in`/`not_in` lists materialized as sets.

use std::collections::HashSet;

use regex::Regex;
use serde_json::Value;

use crate::{
    document::ConditionNode,
    error::{self, CompilationError},
    ir::{Condition, Operator, SimpleCondition}
};

/// Default condition when a rule omits one entirely (spec §3 "RuleEntry").
pub fn default_condition() -> ConditionNode {
    ConditionNode {
        operator: Some("not_empty".to_string()),
        ..Default::default()
    }
}

pub fn compile(rule_id: &str, node: &ConditionNode) -> Result<Condition, CompilationError> {
    if let Some(children) = &node.and {
        return Ok(Condition::And(compile_children(rule_id, children)?));
    }
    if let Some(children) = &node.or {
        return Ok(Condition::Or(compile_children(rule_id, children)?));
    }
    if let Some(child) = &node.not {
        return Ok(Condition::Not(Box::new(compile(rule_id, child)?)));
    }

    let raw_operator = node.operator.as_deref().ok_or_else(|| {
        error::condition_tree_invalid(rule_id, "condition node missing 'operator'")
    })?;
    let operator = Operator::parse(raw_operator)
        .ok_or_else(|| error::unknown_operator(rule_id, raw_operator))?;

    let regex = if operator == Operator::Matches {
        let pattern = as_str_value(rule_id, &node.value)?;
        Some(Regex::new(pattern).map_err(|e| error::invalid_regex(rule_id, pattern, &e))?)
    } else {
        None
    };

    let set = if matches!(operator, Operator::In | Operator::NotIn) {
        Some(materialize_set(rule_id, &node.value)?)
    } else {
        None
    };

    Ok(Condition::Simple(SimpleCondition {
        operator,
        field: node.field.clone(),
        value: node.value.clone(),
        case_sensitive: node.case_sensitive.unwrap_or(true),
        regex,
        set
    }))
}

fn compile_children(
    rule_id: &str,
    children: &[ConditionNode]
) -> Result<Vec<Condition>, CompilationError> {
    if children.is_empty() {
        return Err(error::condition_tree_invalid(
            rule_id,
            "logical condition node must have at least one child"
        ));
    }
    children.iter().map(|child| compile(rule_id, child)).collect()
}

fn as_str_value<'a>(rule_id: &str, value: &'a Option<Value>) -> Result<&'a str, CompilationError> {
    match value.as_ref().and_then(Value::as_str) {
        Some(s) => Ok(s),
        None => Err(error::condition_tree_invalid(
            rule_id,
            "operator 'matches' requires a string pattern value"
        ))
    }
}

fn materialize_set(rule_id: &str, value: &Option<Value>) -> Result<HashSet<String>, CompilationError> {
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(error::condition_tree_invalid(
                rule_id,
                "operators 'in'/'not_in' require a list value"
            ));
        }
    };
    Ok(items
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string()
        })
        .collect())
}
