//! CLI command handlers

use super::args::{Cli, Command, InspectArgs, OutputFormat, RunArgs};
use super::logging::{log, LogLevel};
use crate::data::{load_csv, prepare};
use crate::error::Result;
use crate::pipeline::{self, PipelineConfig};

/// Dispatch the parsed CLI to its handler.
pub fn run_command(cli: Cli) -> Result<()> {
    let level = LogLevel::from_flags(cli.verbose, cli.quiet);
    match cli.command {
        Command::Run(args) => run_pipeline(&args, level),
        Command::Inspect(args) => run_inspect(&args, level),
    }
}

fn run_pipeline(args: &RunArgs, level: LogLevel) -> Result<()> {
    log(
        level,
        LogLevel::Normal,
        &format!("Loading {}", args.input.display()),
    );
    let table = load_csv(&args.input)?;
    log(
        level,
        LogLevel::Verbose,
        &format!("  {} rows, {} columns raw", table.rows.len(), table.headers.len()),
    );

    let config = PipelineConfig {
        label_column: args.label.clone(),
        fraction: args.fraction,
        seed: args.seed,
        cv_folds: args.cv_folds,
        n_trees: args.trees,
        top_k: args.top_k,
    };
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  seed {}, fraction {}, {}-fold CV, {} trees",
            config.seed, config.fraction, config.cv_folds, config.n_trees
        ),
    );

    let report = pipeline::run(&table, &config)?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        }
        OutputFormat::Text => {
            log(level, LogLevel::Normal, &format!("{report}"));
        }
    }
    Ok(())
}

fn run_inspect(args: &InspectArgs, level: LogLevel) -> Result<()> {
    let table = load_csv(&args.input)?;
    let dataset = prepare(&table, &args.label)?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "{}: {} rows × {} features after preparation ({} raw columns)",
            args.input.display(),
            dataset.n_rows(),
            dataset.n_features(),
            table.headers.len()
        ),
    );
    for (class, count) in dataset.classes().iter().zip(dataset.class_counts()) {
        log(level, LogLevel::Normal, &format!("  {class}: {count} rows"));
    }
    if level == LogLevel::Verbose {
        for name in dataset.feature_names() {
            log(level, LogLevel::Verbose, &format!("  feature: {name}"));
        }
    }
    Ok(())
}
