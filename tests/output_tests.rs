use rule_engine::{
    compiler,
    output::{OutputFormat, OutputOptions, format_compile_summary, format_execution_result, summarize},
    runtime::execute,
    table::{ColumnData, Table},
    config::RuntimeConfig
};

const DOCUMENT: &str = r#"
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
    message: "Title is required"
  - id: trim_title
    field: title
    type: transform
    precedence: 600
    condition:
      operator: not_empty
    action:
      operation: trim
"#;

fn title_table(values: &[&str]) -> Table {
    let mut columns = indexmap::IndexMap::new();
    columns.insert(
        "title".to_string(),
        ColumnData::String(values.iter().map(|v| Some(compact_str::CompactString::from(*v))).collect())
    );
    Table::new(columns)
}

#[test]
fn output_format_default_is_text() {
    assert!(matches!(OutputFormat::default(), OutputFormat::Text));
}

#[test]
fn output_options_default_is_colored_text() {
    let opts = OutputOptions::default();
    assert!(matches!(opts.format, OutputFormat::Text));
    assert!(opts.colored);
}

#[test]
fn summarize_reports_total_rules_and_phases() {
    let ruleset = compiler::compile(DOCUMENT).unwrap();
    let summary = summarize(&ruleset);
    assert_eq!(summary.total_rules, 2);
    assert_eq!(summary.marketplace, "acme");
    assert!(!summary.phases.is_empty());
}

#[test]
fn format_compile_summary_text_contains_checksum_and_counts() {
    let ruleset = compiler::compile(DOCUMENT).unwrap();
    let opts = OutputOptions { format: OutputFormat::Text, colored: false };
    let text = format_compile_summary(&ruleset, &opts);
    assert!(text.contains("checksum"));
    assert!(text.contains("total rules: 2"));
}

#[test]
fn format_compile_summary_json_is_valid() {
    let ruleset = compiler::compile(DOCUMENT).unwrap();
    let opts = OutputOptions { format: OutputFormat::Json, colored: false };
    let json = format_compile_summary(&ruleset, &opts);
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["total_rules"], 2);
}

#[test]
fn format_compile_summary_yaml_round_trips() {
    let ruleset = compiler::compile(DOCUMENT).unwrap();
    let opts = OutputOptions { format: OutputFormat::Yaml, colored: false };
    let yaml = format_compile_summary(&ruleset, &opts);
    let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed["marketplace"].as_str(), Some("acme"));
}

#[test]
fn format_execution_result_text_lists_errors_and_transformations() {
    let ruleset = compiler::compile(DOCUMENT).unwrap();
    let table = title_table(&["  Widget  ", ""]);
    let result = execute(&ruleset, &table, &RuntimeConfig::default());

    let opts = OutputOptions { format: OutputFormat::Text, colored: false };
    let text = format_execution_result(&result, &opts);
    assert!(text.contains("title_required"));
    assert!(text.contains("errors"));
}

#[test]
fn format_execution_result_json_is_valid() {
    let ruleset = compiler::compile(DOCUMENT).unwrap();
    let table = title_table(&["  Widget  ", ""]);
    let result = execute(&ruleset, &table, &RuntimeConfig::default());

    let opts = OutputOptions { format: OutputFormat::Json, colored: false };
    let json = format_execution_result(&result, &opts);
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["stats"]["errors"], 1);
}
