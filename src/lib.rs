//! Clasificar: stacked classification pipeline for tabular sensor data
//!
//! Loads a labeled sensor CSV, strips window-summary and identifier
//! columns, partitions the rows into training/testing/validation subsets by
//! stratified sampling, fits discriminant and tree base models, blends them
//! with a stacked meta tree, fits a reference random forest, and evaluates
//! everything on the held-out validation split.
//!
//! ## Architecture
//!
//! - `data`: dataset type, CSV loading, preparation, stratified splitting
//! - `model`: the `Classifier` seam plus LDA/QDA, CART tree, random forest
//!   and the cross-validated complexity-parameter search
//! - `ensemble`: the stacking combiner and its prediction frame
//! - `eval`: confusion matrices, importance rankings, prediction correlation
//! - `pipeline`: end-to-end orchestration and the printable report
//! - `cli`: clap front end
//!
//! ## Example
//!
//! ```no_run
//! use clasificar::data::load_csv;
//! use clasificar::pipeline::{run, PipelineConfig};
//!
//! # fn main() -> clasificar::error::Result<()> {
//! let table = load_csv(std::path::Path::new("pml-training.csv"))?;
//! let report = run(&table, &PipelineConfig::default())?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```
//!
//! Every stochastic step is driven by the seed in [`pipeline::PipelineConfig`];
//! the same seed and input reproduce the report bit for bit.

pub mod cli;
pub mod data;
pub mod ensemble;
pub mod error;
pub mod eval;
pub mod model;
pub mod pipeline;

pub use data::Dataset;
pub use ensemble::{Ensemble, PredictionFrame};
pub use error::{Error, Result};
pub use eval::{evaluate, pairwise_correlation, ConfusionMatrix, Evaluation};
pub use model::{Classifier, ModelKind, Resampling, TrainConfig};
pub use pipeline::{PipelineConfig, Report};
