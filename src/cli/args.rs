//! CLI argument types

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Clasificar: stacked classification pipeline for sensor data
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "clasificar")]
#[command(author = "PAIML")]
#[command(version)]
#[command(
    about = "Stacked classification pipeline: stratified splits, discriminant/tree/forest models, ensemble blending, evaluation reports"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the full pipeline and print the evaluation report
    Run(RunArgs),

    /// Show dataset statistics after preparation, without training
    Inspect(InspectArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// Path to the CSV data file
    #[arg(value_name = "DATA")]
    pub input: PathBuf,

    /// Label column name
    #[arg(long, default_value = "classe")]
    pub label: String,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = 1305)]
    pub seed: u64,

    /// Fraction kept on the larger side of each stratified split
    #[arg(long, default_value_t = 0.7)]
    pub fraction: f64,

    /// Folds for the complexity-parameter cross-validation
    #[arg(long, default_value_t = 10)]
    pub cv_folds: usize,

    /// Number of trees in the random forest
    #[arg(long, default_value_t = 100)]
    pub trees: usize,

    /// Importance-ranking entries to print per model
    #[arg(long, default_value_t = 15)]
    pub top_k: usize,

    /// Report output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the inspect command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InspectArgs {
    /// Path to the CSV data file
    #[arg(value_name = "DATA")]
    pub input: PathBuf,

    /// Label column name
    #[arg(long, default_value = "classe")]
    pub label: String,
}

/// Report output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables
    Text,
    /// Machine-readable JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_run_defaults() {
        let cli = parse(&["clasificar", "run", "data.csv"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.input, PathBuf::from("data.csv"));
        assert_eq!(args.label, "classe");
        assert_eq!(args.seed, 1305);
        assert_eq!(args.cv_folds, 10);
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn test_run_overrides() {
        let cli = parse(&[
            "clasificar",
            "run",
            "d.csv",
            "--seed",
            "7",
            "--trees",
            "50",
            "--format",
            "json",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.seed, 7);
        assert_eq!(args.trees, 50);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&["clasificar", "-v", "inspect", "d.csv"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_missing_input_rejected() {
        assert!(Cli::try_parse_from(["clasificar", "run"]).is_err());
    }
}
