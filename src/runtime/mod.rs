//! Evaluates a `CompiledRuleSet` against a columnar table (spec §4.3).
//!
//! Phase/group dispatch mirrors the teacher's `RuleRunner::analyze`
//! (`src/rules/mod.rs`, not kept — see DESIGN.md), which fans rules out
//! over `rayon::par_iter` and collects per-rule reports; here the same
//! shape drives vectorized/parallel/sequential rule groups instead of a
//! flat rule list.

mod cache;
mod eval;
mod results;
mod transforms;

pub use cache::ConditionCache;
pub use results::{ExecutionResult, ExecutionStats, RuleSuggestion, RuleTransformation, RuleViolation};

use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    time::{Duration, Instant}
};

use indexmap::IndexMap;
use rayon::prelude::*;
use serde_json::Value;

use crate::{
    cfm::Cfm,
    config::RuntimeConfig,
    ir::{Action, CompiledRule, CompiledRuleSet, ExecutionMode, RuleGroup, RuleScope, Severity},
    table::Table
};

/// Execute a compiled rule set against `table`. Never panics for user-rule
/// errors — those are captured as `stats.rule_warnings` (spec §7 "Entry 2 —
/// Execute").
pub fn execute(ruleset: &CompiledRuleSet, table: &Table, config: &RuntimeConfig) -> ExecutionResult {
    let started = Instant::now();
    let deadline = Duration::from_secs_f64(config.timeout_seconds);
    let condition_cache = ConditionCache::new(config.cache_capacity);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_workers.max(1))
        .build()
        .expect("thread pool with a bounded, non-zero worker count always builds");

    let mut result = ExecutionResult::default();
    result.stats.total_rows = table.row_count();

    let canonical_table;
    let table = if ruleset.ccm_mapping.field_mappings.is_empty() {
        table
    } else {
        canonical_table = table.remap(&ruleset.ccm_mapping);
        &canonical_table
    };

    // CFM normalize/validate only apply to tables explicitly canonicalized
    // through a declared `ccm_mapping` (spec §4.5): a raw table with
    // incidentally-named columns is not a canonical record.
    let cfm_table;
    let table = if ruleset.ccm_mapping.field_mappings.is_empty() {
        table
    } else {
        let (normalized, cfm_result) = run_cfm(table);
        result.merge(cfm_result);
        cfm_table = normalized;
        &cfm_table
    };

    let mut working_table = table.clone();
    result.stats.peak_memory_mb = result.stats.peak_memory_mb.max(estimate_memory_mb(table));

    'phases: for phase in &ruleset.execution_plan.phases {
        let phase_table = if phase.phase_type == crate::ir::PhaseType::Suggestion {
            &working_table
        } else {
            table
        };
        let table_identity = cache::table_identity(phase_table);

        for group in &phase.rule_groups {
            if started.elapsed() > deadline {
                result.stats.timed_out = true;
                break 'phases;
            }

            let group_result = run_group(
                group,
                ruleset,
                phase_table,
                table_identity,
                &condition_cache,
                config,
                &pool
            );
            result.merge(group_result);
        }

        if phase.phase_type == crate::ir::PhaseType::Transformation {
            for transformation in result.transformations.clone() {
                working_table = working_table.with_cell_string(
                    &transformation.field,
                    transformation.row_index,
                    transformation.transformed_value.as_str().unwrap_or_default().to_string()
                );
            }
            result.stats.peak_memory_mb = result.stats.peak_memory_mb.max(estimate_memory_mb(&working_table));
        }
    }

    if !config.enable_cache {
        condition_cache.clear();
    }

    result.stats.processed_rows = table.row_count();
    result.stats.execution_time_ms = started.elapsed().as_secs_f64() * 1000.0;
    result
}

/// Run CFM normalize + validate over every row of a canonicalized table,
/// returning the normalized table and the field-level violations found
/// (spec §4.5 "Validate", "Normalize").
fn run_cfm(table: &Table) -> (Table, ExecutionResult) {
    let cfm = Cfm;
    let mut result = ExecutionResult::default();

    let relevant_fields: Vec<_> = cfm.fields().iter().filter(|f| table.has_column(f.name)).collect();
    if relevant_fields.is_empty() {
        return (table.clone(), result);
    }

    let mut normalized_table = table.clone();

    for row in 0..table.row_count() {
        let mut record: IndexMap<String, Value> = IndexMap::new();
        for field in &relevant_fields {
            record.insert(field.name.to_string(), table.cell(field.name, row).unwrap_or(Value::Null));
        }

        let normalized = cfm.normalize_record(&record);
        for field in &relevant_fields {
            match normalized.get(field.name) {
                Some(Value::Null) | None => {}
                Some(Value::String(s)) => {
                    normalized_table = normalized_table.with_cell_string(field.name, row, s.clone());
                }
                Some(other) => {
                    normalized_table = normalized_table.with_cell_string(field.name, row, other.to_string());
                }
            }
        }

        for validation in cfm.validate_record(&normalized) {
            if validation.is_valid {
                continue;
            }
            let violation = RuleViolation {
                rule_id: format!("cfm:{}", validation.field),
                field: validation.field.clone(),
                row_index: Some(row),
                message: validation.message.unwrap_or_default(),
                severity: validation.severity,
                actual_value: validation.original,
                expected_value: None,
                suggestion: validation.suggestion
            };
            match validation.severity {
                Severity::Error => {
                    result.stats.errors += 1;
                    result.errors.push(violation);
                }
                Severity::Warning | Severity::Info => {
                    result.stats.warnings += 1;
                    result.warnings.push(violation);
                }
            }
        }
    }

    (normalized_table, result)
}

/// A coarse estimate of the table's resident size, for `stats.peak_memory_mb`
/// (spec §3/§5). Not a precise allocator accounting — just row count times a
/// per-cell byte estimate, which is enough to spot runaway tables.
fn estimate_memory_mb(table: &Table) -> f64 {
    const ESTIMATED_BYTES_PER_CELL: usize = 32;
    let cells = table.row_count() * table.column_names().count();
    (cells * ESTIMATED_BYTES_PER_CELL) as f64 / (1024.0 * 1024.0)
}

fn run_group(
    group: &RuleGroup,
    ruleset: &CompiledRuleSet,
    table: &Table,
    table_identity: u64,
    cache: &ConditionCache,
    config: &RuntimeConfig,
    pool: &rayon::ThreadPool
) -> ExecutionResult {
    let rules: Vec<&CompiledRule> = group
        .rule_ids
        .iter()
        .filter_map(|id| ruleset.rules.get(id))
        .filter(|rule| rule.enabled)
        .collect();

    let outcomes: Vec<(ExecutionResult, bool)> = match group.execution_mode {
        ExecutionMode::Sequential | ExecutionMode::Vectorized => rules
            .iter()
            .map(|rule| run_rule(rule, table, table_identity, cache, config))
            .collect(),
        ExecutionMode::Parallel => pool.install(|| {
            rules
                .par_iter()
                .map(|rule| run_rule(rule, table, table_identity, cache, config))
                .collect()
        })
    };

    let mut merged = ExecutionResult::default();
    for (partial, stop) in outcomes {
        merged.merge(partial);
        if stop {
            break;
        }
    }
    merged
}

/// Evaluate and act on one rule, with panic-isolation (spec §4.3.6:
/// "Exceptions raised during a single rule's evaluation are caught").
/// Returns the rule's partial result and whether its group should stop.
fn run_rule(
    rule: &CompiledRule,
    table: &Table,
    table_identity: u64,
    cache: &ConditionCache,
    config: &RuntimeConfig
) -> (ExecutionResult, bool) {
    match catch_unwind(AssertUnwindSafe(|| {
        evaluate_rule(rule, table, table_identity, cache, config)
    })) {
        Ok(outcome) => outcome,
        Err(_) => {
            let mut result = ExecutionResult::default();
            result.stats.rules_executed = 1;
            result
                .stats
                .rule_warnings
                .push(format!("rule '{}' raised during evaluation and was skipped", rule.id));
            (result, false)
        }
    }
}

fn evaluate_rule(
    rule: &CompiledRule,
    table: &Table,
    table_identity: u64,
    cache: &ConditionCache,
    config: &RuntimeConfig
) -> (ExecutionResult, bool) {
    let mut result = ExecutionResult::default();
    result.stats.rules_executed = 1;

    if !table.has_column(&rule.field) && rule.condition.referenced_fields().is_empty() {
        result
            .stats
            .rule_warnings
            .push(format!("rule '{}': target field '{}' absent from table", rule.id, rule.field));
        return (result, false);
    }

    let (column, cache_hit) = eval::evaluate_with_cache(
        &rule.id,
        &rule.condition,
        &rule.field,
        table,
        table_identity,
        cache,
        config.enable_cache
    );
    if cache_hit {
        result.stats.cache_hits += 1;
    }
    result.stats.vectorized_operations += 1;

    let mut stop = false;

    match rule.scope {
        RuleScope::Row => apply_action_rowwise(rule, table, &column, &mut result, &mut stop),
        RuleScope::Column | RuleScope::Global => {
            let overall = column.iter().all(|b| *b);
            if matches!(rule.action, Action::Assert { .. }) {
                if !overall {
                    emit_violation(rule, None, table.cell(&rule.field, 0), &mut result);
                    if let Action::Assert { stop_on_error: true } = rule.action {
                        stop = true;
                    }
                }
            } else {
                apply_action_rowwise(rule, table, &column, &mut result, &mut stop);
            }
        }
    }

    (result, stop)
}

fn apply_action_rowwise(
    rule: &CompiledRule,
    table: &Table,
    column: &[bool],
    result: &mut ExecutionResult,
    stop: &mut bool
) {
    match &rule.action {
        Action::Assert { stop_on_error } => {
            for (row, matched) in column.iter().enumerate() {
                if !*matched {
                    emit_violation(rule, Some(row), table.cell(&rule.field, row), result);
                    if *stop_on_error {
                        *stop = true;
                    }
                }
            }
        }
        Action::Transform(spec) => {
            let mut unknown_op_warned = false;
            for (row, matched) in column.iter().enumerate() {
                if !*matched {
                    continue;
                }
                let original = table.cell(&rule.field, row);
                let input = original.as_ref().and_then(Value::as_str).unwrap_or_default();
                match transforms::apply(spec, input) {
                    Ok(transformed) if transformed != input => {
                        result.transformations.push(RuleTransformation {
                            rule_id: rule.id.clone(),
                            field: rule.field.clone(),
                            row_index: row,
                            original_value: original,
                            transformed_value: Value::String(transformed),
                            operation: spec.operation.clone()
                        });
                        result.stats.transformations += 1;
                    }
                    Ok(_) => {}
                    Err(()) if !unknown_op_warned => {
                        unknown_op_warned = true;
                        result.stats.rule_warnings.push(format!(
                            "rule '{}': unknown transform operation '{}'",
                            rule.id, spec.operation
                        ));
                    }
                    Err(()) => {}
                }
            }
        }
        Action::Suggest { suggestions, confidence } => {
            for (row, matched) in column.iter().enumerate() {
                if !*matched {
                    continue;
                }
                result.suggestions.push(RuleSuggestion {
                    rule_id: rule.id.clone(),
                    field: rule.field.clone(),
                    row_index: row,
                    current_value: table.cell(&rule.field, row),
                    suggested_values: suggestions.clone(),
                    confidence: *confidence,
                    reason: rule.message.clone()
                });
                result.stats.suggestions += 1;
            }
        }
    }
}

fn emit_violation(
    rule: &CompiledRule,
    row_index: Option<usize>,
    actual_value: Option<Value>,
    result: &mut ExecutionResult
) {
    let violation = RuleViolation {
        rule_id: rule.id.clone(),
        field: rule.field.clone(),
        row_index,
        message: rule.message.clone(),
        severity: rule.severity,
        actual_value,
        expected_value: None,
        suggestion: None
    };

    match rule.severity {
        Severity::Error => {
            result.stats.errors += 1;
            result.errors.push(violation);
        }
        Severity::Warning | Severity::Info => {
            result.stats.warnings += 1;
            result.warnings.push(violation);
        }
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::table::ColumnData;

    fn string_table(column: &str, values: &[&str]) -> Table {
        let mut columns = IndexMap::new();
        columns.insert(
            column.to_string(),
            ColumnData::String(values.iter().map(|v| Some(compact_str::CompactString::from(*v))).collect())
        );
        Table::new(columns)
    }

    #[test]
    fn title_required_empty_row_produces_one_error() {
        let document = r#"
schema_version: "1.0.0"
marketplace: acme
version: "1.0.0"
rules:
  - id: title_required
    field: title
    type: assert
    condition:
      operator: not_empty
    severity: error
    message: "Title required"
"#;
        let ruleset = crate::compiler::compile(document).unwrap();
        let table = string_table("title", &["A", ""]);
        let result = execute(&ruleset, &table, &RuntimeConfig::default());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].row_index, Some(1));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn trim_transform_emits_only_on_change() {
        let document = r#"
schema_version: "1.0.0"
marketplace: acme
version: "1.0.0"
rules:
  - id: trim_title
    field: title
    type: transform
    condition:
      operator: not_empty
    action:
      operation: trim
"#;
        let ruleset = crate::compiler::compile(document).unwrap();
        let table = string_table("title", &["  hello  ", "world"]);
        let result = execute(&ruleset, &table, &RuntimeConfig::default());
        assert_eq!(result.transformations.len(), 1);
        assert_eq!(result.transformations[0].row_index, 0);
    }

    #[test]
    fn category_suggestion_emits_for_empty_rows() {
        let document = r#"
schema_version: "1.0.0"
marketplace: acme
version: "1.0.0"
rules:
  - id: cat_sug
    field: category
    type: suggest
    condition:
      operator: empty
    action:
      suggestions: ["A", "B"]
      confidence: 0.8
"#;
        let ruleset = crate::compiler::compile(document).unwrap();
        let table = string_table("category", &["", "X", ""]);
        let result = execute(&ruleset, &table, &RuntimeConfig::default());
        assert_eq!(result.suggestions.len(), 2);
        assert_eq!(result.suggestions[0].row_index, 0);
        assert_eq!(result.suggestions[1].row_index, 2);
        assert!(result.suggestions.iter().all(|s| s.confidence == 0.8));
    }

    #[test]
    fn logical_and_condition_flags_short_and_empty_titles() {
        let document = r#"
schema_version: "1.0.0"
marketplace: acme
version: "1.0.0"
rules:
  - id: title_quality
    field: title
    type: assert
    condition:
      and:
        - operator: not_empty
          field: title
        - operator: length_gt
          value: 5
          field: title
    severity: error
"#;
        let ruleset = crate::compiler::compile(document).unwrap();
        let table = string_table("title", &["Widget", "TV", "", "Gadgetron"]);
        let result = execute(&ruleset, &table, &RuntimeConfig::default());
        let rows: Vec<_> = result.errors.iter().map(|e| e.row_index).collect();
        assert_eq!(rows, vec![Some(1), Some(2)]);
    }

    #[test]
    fn validation_phase_does_not_observe_transformation_phase_output() {
        let document = r#"
schema_version: "1.0.0"
marketplace: acme
version: "1.0.0"
rules:
  - id: format_price
    field: price
    type: transform
    precedence: 100
    condition:
      operator: not_empty
    action:
      operation: format
      value: "R$ {value}"
  - id: price_format_check
    field: price
    type: assert
    precedence: 200
    condition:
      operator: matches
      value: "^R\\$.*$"
    severity: error
"#;
        let ruleset = crate::compiler::compile(document).unwrap();
        let table = string_table("price", &["10.0"]);
        let result = execute(&ruleset, &table, &RuntimeConfig::default());
        assert_eq!(result.transformations.len(), 1);
        assert_eq!(result.errors.len(), 1, "validation runs before transformation and must not see the reformatted value");
    }

    #[test]
    fn empty_table_produces_no_results() {
        let document = r#"
schema_version: "1.0.0"
marketplace: acme
version: "1.0.0"
rules:
  - id: title_required
    field: title
    type: assert
    condition:
      operator: not_empty
"#;
        let ruleset = crate::compiler::compile(document).unwrap();
        let table = string_table("title", &[]);
        let result = execute(&ruleset, &table, &RuntimeConfig::default());
        assert_eq!(result.errors.len(), 0);
        assert_eq!(result.stats.processed_rows, 0);
    }

    #[test]
    fn ccm_mapping_canonicalizes_source_columns_before_rule_evaluation() {
        let document = r#"
schema_version: "1.0.0"
marketplace: acme
version: "1.0.0"
ccm_mapping:
  title: nome_produto
rules:
  - id: title_required
    field: title
    type: assert
    condition:
      operator: not_empty
    severity: error
    message: "Title required"
"#;
        let ruleset = crate::compiler::compile(document).unwrap();
        let table = string_table("nome_produto", &["Widget", ""]);
        let result = execute(&ruleset, &table, &RuntimeConfig::default());
        assert!(result.errors.iter().any(|e| e.rule_id == "title_required" && e.row_index == Some(1)));
    }

    #[test]
    fn ccm_mapping_runs_cfm_validation_on_canonicalized_columns() {
        let document = r#"
schema_version: "1.0.0"
marketplace: acme
version: "1.0.0"
ccm_mapping:
  title: nome_produto
rules:
  - id: noop
    field: title
    type: assert
    condition:
      operator: not_empty
"#;
        let ruleset = crate::compiler::compile(document).unwrap();
        let table = string_table("nome_produto", &["A fully fledged product title"]);
        let result = execute(&ruleset, &table, &RuntimeConfig::default());
        assert!(
            !result.errors.iter().any(|e| e.rule_id == "cfm:title"),
            "a title meeting the canonical length bound should not raise a CFM violation"
        );

        let table = string_table("nome_produto", &["short"]);
        let result = execute(&ruleset, &table, &RuntimeConfig::default());
        assert!(
            result.errors.iter().any(|e| e.rule_id == "cfm:title"),
            "a title under the canonical minimum length should raise a CFM violation"
        );
    }
}
