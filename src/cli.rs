use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Declarative rule-document compiler and vectorized runtime
#[derive(Parser, Debug)]
#[command(name = "rule-engine")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a rule document into an execution plan and report its stats
    Compile {
        /// Path to the YAML rule document
        document: PathBuf,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    },

    /// Compile a rule document and execute it against a CSV table
    Run {
        /// Path to the YAML rule document
        document: PathBuf,

        /// Path to the CSV table to validate
        table: PathBuf,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Bounded worker pool size for parallel rule groups
        #[arg(long)]
        max_workers: Option<usize>,

        /// Soft execution deadline, in seconds
        #[arg(long)]
        timeout_seconds: Option<f64>
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
