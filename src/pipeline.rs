//! End-to-end classification pipeline
//!
//! Orchestrates the whole run: prepare → partition twice → fit base models
//! → stack → fit the reference forest → evaluate everything on the
//! untouched validation split. Fail-fast: the first stage error aborts the
//! run, since every later stage depends on the full success of earlier ones
//! and retrying a deterministic stage would only reproduce the failure.

use crate::data::{prepare, stratified_split, Dataset, RawTable};
use crate::ensemble::Ensemble;
use crate::error::Result;
use crate::eval::{evaluate, pairwise_correlation, Evaluation};
use crate::model::{
    fit_model, DecisionTree, LinearDiscriminant, ModelKind, QuadraticDiscriminant, Resampling,
    TrainConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fmt;

/// Everything a run needs besides the data itself.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineConfig {
    /// Name of the label column in the raw table
    pub label_column: String,
    /// Fraction kept on the larger side of each stratified split
    pub fraction: f64,
    /// Seed for every stochastic stage of the run
    pub seed: u64,
    /// Folds for the complexity-parameter cross-validation
    pub cv_folds: usize,
    /// Trees in the random forest
    pub n_trees: usize,
    /// Importance-ranking truncation
    pub top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label_column: "classe".to_string(),
            fraction: 0.7,
            seed: 1305,
            cv_folds: 10,
            n_trees: 100,
            top_k: 15,
        }
    }
}

/// Row counts of the three disjoint subsets.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SplitSizes {
    /// Rows used to fit base models and the forest
    pub training: usize,
    /// Rows the stacking combiner trains its meta model on
    pub testing: usize,
    /// Held-out rows every model is scored against
    pub validation: usize,
}

/// Full run output, ready for text or JSON rendering.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    /// Rows after preparation
    pub rows: usize,
    /// Feature columns after preparation
    pub features: usize,
    /// Canonical class names
    pub classes: Vec<String>,
    /// Subset sizes
    pub split: SplitSizes,
    /// Complexity parameter the cross-validation selected for the tree
    pub selected_cp: f64,
    /// One evaluation per model, validation split, pipeline order
    pub evaluations: Vec<Evaluation>,
    /// Base model names, ensemble order
    pub base_models: Vec<String>,
    /// Pearson correlation of base predictions on the stacking split
    pub base_prediction_correlation: Vec<Vec<f64>>,
}

/// Prepare a raw table and run the full pipeline on it.
pub fn run(table: &RawTable, config: &PipelineConfig) -> Result<Report> {
    let dataset = prepare(table, &config.label_column)?;
    run_prepared(&dataset, config)
}

/// Run the pipeline on an already prepared dataset.
pub fn run_prepared(dataset: &Dataset, config: &PipelineConfig) -> Result<Report> {
    let n_classes = dataset.n_classes();

    // One explicit RNG threads through both partition steps; the same seed
    // always reproduces the same three subsets.
    let mut rng = StdRng::seed_from_u64(config.seed);
    let (building, validation) = stratified_split(dataset, config.fraction, &mut rng)?;
    let (training, testing) = stratified_split(&building, config.fraction, &mut rng)?;

    let train_config = TrainConfig {
        resampling: Resampling::KFoldCv(config.cv_folds),
        n_trees: config.n_trees,
        seed: config.seed,
        ..TrainConfig::default()
    };

    // Base models: the tree's complexity parameter is tuned by k-fold CV on
    // the training split; the discriminants have nothing to tune.
    let selected_cp = crate::model::cross_validate_cp(
        training.features(),
        training.labels(),
        n_classes,
        &train_config.cp_grid,
        config.cv_folds,
        config.seed,
    )?;

    let mut ensemble = Ensemble::new(train_config.clone());
    ensemble.push_base(Box::new(LinearDiscriminant::new()));
    ensemble.push_base(Box::new(QuadraticDiscriminant::new()));
    ensemble.push_base(Box::new(DecisionTree::new(selected_cp)));
    ensemble.fit_base(training.features(), training.labels(), n_classes)?;

    // The meta model trains on base predictions over the testing split,
    // which no base model has seen.
    let frame = ensemble.build_meta_training_frame(testing.features(), testing.labels())?;
    ensemble.fit_meta(&frame, n_classes)?;

    let base_prediction_correlation =
        pairwise_correlation(&ensemble.base_predictions(testing.features())?);

    let forest = fit_model(
        ModelKind::RandomForest,
        training.features(),
        training.labels(),
        n_classes,
        &train_config,
    )?;

    // Score every model, the stack included, on the untouched validation
    // split.
    let mut evaluations = Vec::new();
    for model in ensemble.bases() {
        evaluations.push(evaluate(model.as_ref(), &validation, config.top_k)?);
    }
    evaluations.push(evaluate(&ensemble, &validation, config.top_k)?);
    evaluations.push(evaluate(forest.as_ref(), &validation, config.top_k)?);

    Ok(Report {
        rows: dataset.n_rows(),
        features: dataset.n_features(),
        classes: dataset.classes().to_vec(),
        split: SplitSizes {
            training: training.n_rows(),
            testing: testing.n_rows(),
            validation: validation.n_rows(),
        },
        selected_cp,
        evaluations,
        base_models: ensemble.base_names(),
        base_prediction_correlation,
    })
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Dataset: {} rows × {} features, {} classes ({})",
            self.rows,
            self.features,
            self.classes.len(),
            self.classes.join(", ")
        )?;
        writeln!(
            f,
            "Split: training {}, testing {}, validation {}",
            self.split.training, self.split.testing, self.split.validation
        )?;
        writeln!(f, "Selected complexity parameter: {}", self.selected_cp)?;

        for eval in &self.evaluations {
            writeln!(f)?;
            writeln!(
                f,
                "── {} ── accuracy {:.4}, out-of-sample error {:.2}%",
                eval.model_name, eval.accuracy, eval.out_of_sample_error_pct
            )?;
            write!(f, "{}", eval.confusion)?;
            if let Some(importance) = &eval.importance {
                writeln!(f, "top predictors:")?;
                for entry in importance {
                    writeln!(f, "  {:<24} {:.4}", entry.feature, entry.score)?;
                }
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Base prediction correlation ({}):",
            self.base_models.join(" / ")
        )?;
        for row in &self.base_prediction_correlation {
            let cells: Vec<String> = row.iter().map(|v| format!("{v:>7.4}")).collect();
            writeln!(f, "  {}", cells.join(" "))?;
        }
        Ok(())
    }
}
