//! Grouping, phase split, and index construction (spec §4.2 steps 7-9).
//!
//! Phase assignment is derived first (by `action.type`, per the REDESIGN
//! FLAG settled in spec §9), then each phase's rules are grouped in
//! precedence-then-id order — equivalent to the spec's step 7/8 ordering,
//! but guarantees each group is homogeneous in action type, which a
//! group-then-split ordering cannot.

use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;

use crate::ir::{
    CompiledRule, ExecutionMode, ExecutionPhase, ExecutionPlan, PhaseType, RuleGroup, RuleScope
};

const MAX_GROUP_SIZE: usize = 10;

pub fn build(
    rules: &IndexMap<String, CompiledRule>,
    dependencies: &IndexMap<String, Vec<String>>,
    parallel_batch_size: usize
) -> ExecutionPlan {
    let ordered = ordered_ids(rules);

    let mut by_phase: IndexMap<PhaseType, Vec<&String>> = IndexMap::new();
    for id in &ordered {
        let rule = &rules[id];
        let phase = PhaseType::for_action_type(rule.action_type());
        by_phase.entry(phase).or_default().push(id);
    }

    let mut phases = Vec::new();
    for phase_type in [PhaseType::Validation, PhaseType::Transformation, PhaseType::Suggestion] {
        let ids = by_phase.get(&phase_type).cloned().unwrap_or_default();
        let rule_groups = group_rules(&ids, rules, dependencies);
        let can_vectorize = rule_groups
            .iter()
            .any(|g| g.execution_mode == ExecutionMode::Vectorized);
        phases.push(ExecutionPhase { phase_type, rule_groups, can_vectorize });
    }

    let field_index = build_field_index(&ordered, rules);
    let precedence_index = build_precedence_index(&ordered, rules);
    let parallel_groups = build_parallel_groups(&ordered, rules, dependencies, parallel_batch_size);

    let mut optimizations = Vec::new();
    if phases.iter().any(|p| p.can_vectorize) {
        optimizations.push("vectorized_condition_evaluation".to_string());
    }
    if !parallel_groups.is_empty() {
        optimizations.push("bounded_parallel_dispatch".to_string());
    }
    optimizations.push("condition_result_cache".to_string());

    ExecutionPlan { phases, field_index, precedence_index, parallel_groups, optimizations }
}

fn ordered_ids(rules: &IndexMap<String, CompiledRule>) -> Vec<String> {
    let mut ids: Vec<String> = rules.keys().cloned().collect();
    ids.sort_by(|a, b| {
        let ra = &rules[a];
        let rb = &rules[b];
        ra.precedence.cmp(&rb.precedence).then_with(|| a.cmp(b))
    });
    ids
}

fn preferred_mode(rule: &CompiledRule) -> ExecutionMode {
    if rule.scope == RuleScope::Row {
        if is_vectorizable(&rule.condition) {
            ExecutionMode::Vectorized
        } else {
            ExecutionMode::Parallel
        }
    } else {
        ExecutionMode::Sequential
    }
}

fn is_vectorizable(condition: &crate::ir::Condition) -> bool {
    use crate::ir::Condition;
    match condition {
        Condition::Simple(simple) => simple.operator.is_vectorizable(),
        Condition::And(children) | Condition::Or(children) => {
            children.iter().all(is_vectorizable)
        }
        Condition::Not(child) => is_vectorizable(child)
    }
}

fn group_rules(
    ids: &[&String],
    rules: &IndexMap<String, CompiledRule>,
    dependencies: &IndexMap<String, Vec<String>>
) -> Vec<RuleGroup> {
    let mut groups: Vec<RuleGroup> = Vec::new();
    let mut current_ids: Vec<String> = Vec::new();
    let mut current_mode: Option<ExecutionMode> = None;
    let mut group_fields: HashSet<String> = HashSet::new();
    let mut group_deps: HashSet<String> = HashSet::new();

    let flush = |groups: &mut Vec<RuleGroup>,
                 current_ids: &mut Vec<String>,
                 current_mode: &mut Option<ExecutionMode>,
                 group_fields: &mut HashSet<String>,
                 group_deps: &mut HashSet<String>| {
        if let Some(mode) = current_mode.take() {
            groups.push(RuleGroup {
                rule_ids: std::mem::take(current_ids),
                execution_mode: mode,
                dependencies: group_deps.iter().cloned().collect()
            });
        }
        group_fields.clear();
        group_deps.clear();
    };

    for id in ids {
        let rule = &rules[*id];
        let mode = preferred_mode(rule);
        let deps = dependencies.get(*id).cloned().unwrap_or_default();
        let conflicts = deps.iter().any(|d| group_fields.contains(d)) || group_deps.contains(&rule.field);

        let fits = current_mode == Some(mode) && current_ids.len() < MAX_GROUP_SIZE && !conflicts;

        if !fits {
            flush(&mut groups, &mut current_ids, &mut current_mode, &mut group_fields, &mut group_deps);
            current_mode = Some(mode);
        }

        current_ids.push((*id).clone());
        group_fields.insert(rule.field.clone());
        group_deps.extend(deps);
    }
    flush(&mut groups, &mut current_ids, &mut current_mode, &mut group_fields, &mut group_deps);

    groups
}

fn build_field_index(
    ordered: &[String],
    rules: &IndexMap<String, CompiledRule>
) -> IndexMap<String, Vec<String>> {
    let mut index: IndexMap<String, Vec<String>> = IndexMap::new();
    for id in ordered {
        index.entry(rules[id].field.clone()).or_default().push(id.clone());
    }
    index
}

fn build_precedence_index(
    ordered: &[String],
    rules: &IndexMap<String, CompiledRule>
) -> BTreeMap<i64, Vec<String>> {
    let mut index: BTreeMap<i64, Vec<String>> = BTreeMap::new();
    for id in ordered {
        index.entry(rules[id].precedence).or_default().push(id.clone());
    }
    index
}

fn build_parallel_groups(
    ordered: &[String],
    rules: &IndexMap<String, CompiledRule>,
    dependencies: &IndexMap<String, Vec<String>>,
    batch_size: usize
) -> Vec<Vec<String>> {
    let independent: Vec<String> = ordered
        .iter()
        .filter(|id| {
            rules[*id].scope == RuleScope::Row
                && dependencies.get(*id).map(Vec::is_empty).unwrap_or(true)
        })
        .cloned()
        .collect();

    let batch_size = batch_size.max(1);
    independent
        .chunks(batch_size)
        .map(|chunk| chunk.to_vec())
        .collect()
}
