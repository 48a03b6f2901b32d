//! The four output streams plus execution stats (spec §3 "ExecutionResult").

use serde::Serialize;
use serde_json::Value;

use crate::ir::Severity;

#[derive(Debug, Clone, Serialize)]
pub struct RuleViolation {
    pub rule_id:        String,
    pub field:          String,
    pub row_index:      Option<usize>,
    pub message:        String,
    pub severity:       Severity,
    pub actual_value:   Option<Value>,
    pub expected_value: Option<Value>,
    pub suggestion:     Option<String>
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleSuggestion {
    pub rule_id:         String,
    pub field:           String,
    pub row_index:       usize,
    pub current_value:   Option<Value>,
    pub suggested_values: Vec<String>,
    pub confidence:      f64,
    pub reason:          String
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleTransformation {
    pub rule_id:          String,
    pub field:            String,
    pub row_index:        usize,
    pub original_value:   Option<Value>,
    pub transformed_value: Value,
    pub operation:        String
}

/// Execution counters (spec §3 "ExecutionResult", §6 "Stats format": numeric
/// counters only, all timing in milliseconds).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionStats {
    pub total_rows:          usize,
    pub processed_rows:      usize,
    pub errors:              usize,
    pub warnings:            usize,
    pub suggestions:         usize,
    pub transformations:     usize,
    pub rules_executed:      usize,
    pub vectorized_operations: usize,
    pub cache_hits:          usize,
    pub execution_time_ms:   f64,
    pub peak_memory_mb:      f64,
    pub timed_out:           bool,
    /// Rules that raised during evaluation; captured, never propagated
    /// (spec §4.3.6, §7 "RuleEvaluationError").
    pub rule_warnings:       Vec<String>
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionResult {
    pub errors:          Vec<RuleViolation>,
    pub warnings:        Vec<RuleViolation>,
    pub suggestions:     Vec<RuleSuggestion>,
    pub transformations: Vec<RuleTransformation>,
    pub stats:           ExecutionStats
}

impl ExecutionResult {
    pub fn merge(&mut self, other: ExecutionResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.suggestions.extend(other.suggestions);
        self.transformations.extend(other.transformations);
        self.stats.errors += other.stats.errors;
        self.stats.warnings += other.stats.warnings;
        self.stats.suggestions += other.stats.suggestions;
        self.stats.transformations += other.stats.transformations;
        self.stats.rules_executed += other.stats.rules_executed;
        self.stats.vectorized_operations += other.stats.vectorized_operations;
        self.stats.cache_hits += other.stats.cache_hits;
        self.stats.rule_warnings.extend(other.stats.rule_warnings);
    }
}
