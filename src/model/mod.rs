//! Classification models
//!
//! Every model implements the object-safe [`Classifier`] trait so the
//! pipeline, the stacking combiner, and the evaluator are all polymorphic
//! over the concrete algorithm:
//!
//! - `discriminant`: linear and quadratic Gaussian discriminant analysis
//! - `tree`: CART decision tree with a complexity-parameter pruning gate
//! - `forest`: random forest of bootstrapped trees
//! - `tune`: k-fold cross-validated complexity-parameter search

pub mod discriminant;
pub mod forest;
pub mod tree;
pub mod tune;

pub use discriminant::{LinearDiscriminant, QuadraticDiscriminant};
pub use forest::RandomForest;
pub use tree::DecisionTree;
pub use tune::cross_validate_cp;

use crate::error::{Error, Result};
use ndarray::Array2;

/// A trainable multi-class classifier.
///
/// `fit` consumes an n×p feature matrix and integer labels in
/// `0..n_classes`; `predict` returns one label per input row, in row order.
/// Models that track per-feature contribution (trees, forests) report it
/// through `feature_importance`; discriminant models return `None`.
pub trait Classifier: std::fmt::Debug {
    /// Short human-readable model name for reports
    fn name(&self) -> &str;

    /// Fit to the given features and labels.
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()>;

    /// Predict a label for each row. Errors if the model is not fitted.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>>;

    /// Per-feature contribution scores, if the model tracks them.
    fn feature_importance(&self) -> Option<Vec<f64>> {
        None
    }
}

/// The closed set of model kinds the pipeline trains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    /// Linear discriminant analysis (pooled covariance)
    LinearDiscriminant,
    /// Quadratic discriminant analysis (per-class covariance)
    QuadraticDiscriminant,
    /// Single CART decision tree
    DecisionTree,
    /// Random forest of bootstrapped trees
    RandomForest,
}

/// Resampling policy used during fitting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resampling {
    /// Fit once on all training rows (models without hyperparameters)
    None,
    /// k-fold cross-validation for hyperparameter selection
    KFoldCv(usize),
}

/// Training configuration shared by all model kinds.
#[derive(Clone, Debug)]
pub struct TrainConfig {
    /// Complexity-parameter grid searched for tree-based models
    pub cp_grid: Vec<f64>,
    /// Resampling policy for the grid search
    pub resampling: Resampling,
    /// Number of trees in a random forest
    pub n_trees: usize,
    /// Seed for every stochastic step of the fit
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            cp_grid: vec![0.0001, 0.001, 0.01, 0.05, 0.1],
            resampling: Resampling::KFoldCv(10),
            n_trees: 100,
            seed: 1305,
        }
    }
}

/// Fit a model of the given kind.
///
/// Discriminant models ignore the resampling policy (they have no
/// hyperparameters). Tree-based kinds run the cross-validated
/// complexity-parameter search when `resampling` asks for it, then refit on
/// all rows with the winning value. Fit failures are single-shot: a
/// degenerate fold ([`Error::Fit`]) or a singular covariance
/// ([`Error::Convergence`]) aborts without retry.
pub fn fit_model(
    kind: ModelKind,
    x: &Array2<f64>,
    y: &[usize],
    n_classes: usize,
    config: &TrainConfig,
) -> Result<Box<dyn Classifier>> {
    let mut model: Box<dyn Classifier> = match kind {
        ModelKind::LinearDiscriminant => Box::new(LinearDiscriminant::new()),
        ModelKind::QuadraticDiscriminant => Box::new(QuadraticDiscriminant::new()),
        ModelKind::DecisionTree => {
            let cp = match config.resampling {
                Resampling::KFoldCv(k) => {
                    cross_validate_cp(x, y, n_classes, &config.cp_grid, k, config.seed)?
                }
                Resampling::None => default_cp(&config.cp_grid)?,
            };
            Box::new(DecisionTree::new(cp))
        }
        ModelKind::RandomForest => Box::new(RandomForest::new(config.n_trees, config.seed)),
    };
    model.fit(x, y, n_classes)?;
    Ok(model)
}

fn default_cp(grid: &[f64]) -> Result<f64> {
    grid.first()
        .copied()
        .ok_or_else(|| Error::Fit("empty complexity-parameter grid".to_string()))
}

/// Copy the given rows of a feature matrix into a new matrix.
pub(crate) fn take_rows(x: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    let mut out = Array2::zeros((indices.len(), x.ncols()));
    for (i, &idx) in indices.iter().enumerate() {
        out.row_mut(i).assign(&x.row(idx));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_model_rejects_empty_grid() {
        let x = array![[0.0], [1.0], [0.0], [1.0]];
        let y = vec![0, 1, 0, 1];
        let config = TrainConfig {
            cp_grid: vec![],
            resampling: Resampling::None,
            ..TrainConfig::default()
        };
        let err = fit_model(ModelKind::DecisionTree, &x, &y, 2, &config).unwrap_err();
        assert!(matches!(err, Error::Fit(_)));
    }

    #[test]
    fn test_fit_model_builds_each_kind() {
        let x = array![
            [0.0, 0.1],
            [0.2, -0.1],
            [-0.1, 0.0],
            [0.1, 0.2],
            [5.0, 5.1],
            [5.2, 4.9],
            [4.9, 5.0],
            [5.1, 5.2],
        ];
        let y = vec![0, 0, 0, 0, 1, 1, 1, 1];
        let config = TrainConfig {
            resampling: Resampling::None,
            n_trees: 5,
            ..TrainConfig::default()
        };
        for kind in [
            ModelKind::LinearDiscriminant,
            ModelKind::QuadraticDiscriminant,
            ModelKind::DecisionTree,
            ModelKind::RandomForest,
        ] {
            let model = fit_model(kind, &x, &y, 2, &config).unwrap();
            assert_eq!(model.predict(&x).unwrap(), y, "{} misfits", model.name());
        }
    }

    #[test]
    fn test_take_rows() {
        let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let sub = take_rows(&x, &[2, 0]);
        assert_eq!(sub, array![[5.0, 6.0], [1.0, 2.0]]);
    }
}
