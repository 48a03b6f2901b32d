//! # Rule Engine CLI
//!
//! Command-line front end for the rule engine: compiles a declarative YAML
//! rule document into a `CompiledRuleSet` and, optionally, executes it
//! against a CSV table.
//!
//! # Quick Start
//!
//! ```bash
//! # Compile a rule document and inspect its execution plan
//! rule-engine-cli compile rules.yaml
//!
//! # Compile and run against a table, as JSON
//! rule-engine-cli run rules.yaml products.csv -f json
//! ```
//!
//! # Exit Codes
//!
//! - `0` - success, no errors or warnings (or `compile` with no table)
//! - `1` - warnings found
//! - `2` - errors found, or a compilation/IO failure
//!
//! # Modules
//!
//! - [`rule_engine::compiler`] - rule document compiler
//! - [`rule_engine::runtime`] - vectorized rule execution
//! - [`rule_engine::cfm`] - canonical field model
//! - [`rule_engine::table`] - columnar table representation
//! - [`rule_engine::config`] - configuration loading
//! - [`rule_engine::output`] - result formatting
//! - [`rule_engine::error`] - error types and constructors

mod cfm;
mod cli;
mod compiler;
mod config;
mod document;
mod error;
mod ir;
mod output;
mod runtime;
mod table;

use std::{fs::read_to_string, process};

use clap::Parser;

use crate::{
    cli::{Cli, Commands, Format},
    config::Config,
    error::{AppResult, file_read_error},
    ir::Severity,
    output::{OutputFormat, OutputOptions, format_compile_summary, format_execution_result},
    table::Table
};

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}

fn to_output_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}

fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Compile { document, output_format, no_color } => {
            let source = read_to_string(&document)
                .map_err(|e| file_read_error(&document.display().to_string(), e))?;

            let ruleset = compiler::compile(&source)?;
            let opts = OutputOptions { format: to_output_format(output_format), colored: !no_color };
            println!("{}", format_compile_summary(&ruleset, &opts));
            Ok(0)
        }
        Commands::Run { document, table, output_format, no_color, max_workers, timeout_seconds } => {
            let source = read_to_string(&document)
                .map_err(|e| file_read_error(&document.display().to_string(), e))?;
            let ruleset = compiler::compile(&source)?;

            let csv = read_to_string(&table)
                .map_err(|e| file_read_error(&table.display().to_string(), e))?;
            let parsed_table = parse_csv(&csv);

            let mut runtime_config = config.runtime;
            if let Some(workers) = max_workers {
                runtime_config.max_workers = workers;
            }
            if let Some(timeout) = timeout_seconds {
                runtime_config.timeout_seconds = timeout;
            }

            let result = runtime::execute(&ruleset, &parsed_table, &runtime_config);
            let opts = OutputOptions { format: to_output_format(output_format), colored: !no_color };
            println!("{}", format_execution_result(&result, &opts));

            let exit_code = if result.errors.iter().any(|v| v.severity == Severity::Error) {
                2
            } else if !result.warnings.is_empty() {
                1
            } else {
                0
            };
            Ok(exit_code)
        }
    }
}

/// Parses a CSV table: a header row followed by comma-separated data rows.
/// No quoting support — matches the plain string-cell model `Table` expects.
/// Only a single trailing blank line (the artifact of a final newline) is
/// dropped; interior blank lines are kept as single-column empty-string rows.
fn parse_csv(source: &str) -> Table {
    let mut lines: Vec<&str> = source.lines().collect();
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    let mut lines = lines.into_iter();

    let headers: Vec<String> = lines
        .next()
        .map(|line| line.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();

    let rows: Vec<Vec<String>> =
        lines.map(|line| line.split(',').map(|s| s.trim().to_string()).collect()).collect();

    Table::from_rows(headers, rows)
}
