use clap::Parser;
use rule_engine::cli::{Cli, Commands, Format};

#[test]
fn parses_compile_subcommand() {
    let cli = Cli::parse_from(["rule-engine", "compile", "rules.yaml"]);
    match cli.command {
        Commands::Compile { document, output_format, no_color } => {
            assert_eq!(document.to_str().unwrap(), "rules.yaml");
            assert_eq!(output_format, Format::Text);
            assert!(!no_color);
        }
        _ => panic!("expected Compile")
    }
}

#[test]
fn parses_run_subcommand_with_options() {
    let cli = Cli::parse_from([
        "rule-engine",
        "run",
        "rules.yaml",
        "table.csv",
        "-f",
        "json",
        "--no-color",
        "--max-workers",
        "8"
    ]);
    match cli.command {
        Commands::Run { document, table, output_format, no_color, max_workers, .. } => {
            assert_eq!(document.to_str().unwrap(), "rules.yaml");
            assert_eq!(table.to_str().unwrap(), "table.csv");
            assert_eq!(output_format, Format::Json);
            assert!(no_color);
            assert_eq!(max_workers, Some(8));
        }
        _ => panic!("expected Run")
    }
}

#[test]
fn format_variants() {
    let _text = Format::Text;
    let _json = Format::Json;
    let _yaml = Format::Yaml;
}

#[test]
fn format_debug() {
    let format = Format::Yaml;
    let debug = format!("{:?}", format);
    assert!(debug.contains("Yaml"));
}
