//! Clasificar CLI
//!
//! Single-command entry point for the clasificar pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Run the full pipeline on a sensor CSV
//! clasificar run pml-training.csv
//!
//! # Run with overrides
//! clasificar run pml-training.csv --seed 7 --trees 200 --format json
//!
//! # Show dataset statistics after preparation
//! clasificar inspect pml-training.csv
//! ```

use clap::Parser;
use clasificar::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
