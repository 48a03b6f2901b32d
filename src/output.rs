//! Result formatting for the CLI's `text`/`json`/`yaml` output formats
//! (mirrors the teacher's `output.rs`: a thin `OutputFormat`/`OutputOptions`
//! pair plus per-shape formatting functions).

use colored::Colorize;
use serde::Serialize;

use crate::{
    ir::CompiledRuleSet,
    runtime::ExecutionResult
};

#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self { format: OutputFormat::Text, colored: true }
    }
}

/// A serializable projection of a `CompiledRuleSet` (the IR itself can't
/// derive `Serialize` — condition trees hold compiled `Regex` values).
#[derive(Debug, Serialize)]
pub struct CompileSummary {
    pub schema_version:        String,
    pub marketplace:           String,
    pub version:               String,
    pub checksum:               String,
    pub total_rules:           usize,
    pub rules_by_type:         std::collections::HashMap<String, usize>,
    pub rules_by_field:        std::collections::HashMap<String, usize>,
    pub compilation_time_ms:   f64,
    pub optimizations_applied: usize,
    pub phases:                Vec<PhaseSummary>
}

#[derive(Debug, Serialize)]
pub struct PhaseSummary {
    pub phase_type:  String,
    pub group_count: usize,
    pub rule_count:  usize
}

pub fn summarize(ruleset: &CompiledRuleSet) -> CompileSummary {
    let phases = ruleset
        .execution_plan
        .phases
        .iter()
        .map(|phase| PhaseSummary {
            phase_type: phase.phase_type.as_str().to_string(),
            group_count: phase.rule_groups.len(),
            rule_count: phase.rule_groups.iter().map(|g| g.rule_ids.len()).sum()
        })
        .collect();

    CompileSummary {
        schema_version: ruleset.schema_version.clone(),
        marketplace: ruleset.marketplace.clone(),
        version: ruleset.version.to_string(),
        checksum: ruleset.checksum.clone(),
        total_rules: ruleset.stats.total_rules,
        rules_by_type: ruleset.stats.rules_by_type.clone(),
        rules_by_field: ruleset.stats.rules_by_field.clone(),
        compilation_time_ms: ruleset.stats.compilation_time_ms,
        optimizations_applied: ruleset.stats.optimizations_applied,
        phases
    }
}

pub fn format_compile_summary(ruleset: &CompiledRuleSet, opts: &OutputOptions) -> String {
    let summary = summarize(ruleset);
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(&summary).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(&summary).unwrap_or_default(),
        OutputFormat::Text => format_compile_text(&summary, opts)
    }
}

fn format_compile_text(summary: &CompileSummary, opts: &OutputOptions) -> String {
    let mut out = String::new();
    let header = format!("=== Compiled ruleset: {} v{} ===\n", summary.marketplace, summary.version);
    out.push_str(&if opts.colored { header.bold().to_string() } else { header });
    out.push_str(&format!("checksum:    {}\n", summary.checksum));
    out.push_str(&format!("total rules: {}\n", summary.total_rules));
    out.push_str(&format!("compiled in: {:.3}ms\n\n", summary.compilation_time_ms));

    for phase in &summary.phases {
        let line = format!(
            "{:<15} {} groups, {} rules\n",
            phase.phase_type, phase.group_count, phase.rule_count
        );
        out.push_str(&if opts.colored { line.cyan().to_string() } else { line });
    }
    out
}

pub fn format_execution_result(result: &ExecutionResult, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(result).unwrap_or_default(),
        OutputFormat::Text => format_execution_text(result, opts)
    }
}

fn format_execution_text(result: &ExecutionResult, opts: &OutputOptions) -> String {
    let mut out = String::new();
    let header = "=== Execution result ===\n";
    out.push_str(&if opts.colored { header.bold().to_string() } else { header.to_string() });

    for violation in &result.errors {
        let line = format!(
            "[ERROR] {} field={} row={:?}: {}\n",
            violation.rule_id, violation.field, violation.row_index, violation.message
        );
        out.push_str(&if opts.colored { line.red().to_string() } else { line });
    }
    for violation in &result.warnings {
        let line = format!(
            "[WARN]  {} field={} row={:?}: {}\n",
            violation.rule_id, violation.field, violation.row_index, violation.message
        );
        out.push_str(&if opts.colored { line.yellow().to_string() } else { line });
    }
    for transformation in &result.transformations {
        out.push_str(&format!(
            "[TRANSFORM] {} field={} row={}: {:?} -> {}\n",
            transformation.rule_id,
            transformation.field,
            transformation.row_index,
            transformation.original_value,
            transformation.transformed_value
        ));
    }
    for suggestion in &result.suggestions {
        out.push_str(&format!(
            "[SUGGEST] {} field={} row={}: {:?} (confidence {:.2})\n",
            suggestion.rule_id,
            suggestion.field,
            suggestion.row_index,
            suggestion.suggested_values,
            suggestion.confidence
        ));
    }

    out.push_str(&format!(
        "\n{} errors, {} warnings, {} transformations, {} suggestions ({:.3}ms, {} rows)\n",
        result.stats.errors,
        result.stats.warnings,
        result.stats.transformations,
        result.stats.suggestions,
        result.stats.execution_time_ms,
        result.stats.processed_rows
    ));

    out
}
