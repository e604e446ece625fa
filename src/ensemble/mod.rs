//! Stacked ensemble
//!
//! A stacked ensemble blends an ordered list of base classifiers through a
//! meta decision tree that is trained not on raw features but on the base
//! models' predicted labels. The meta model must see base predictions on
//! rows the bases were *not* fitted on, so the pipeline feeds
//! [`Ensemble::build_meta_training_frame`] a split disjoint from the base
//! training split.
//!
//! The ensemble is not self-contained at inference either: `predict` first
//! runs every base model over the input and reassembles the same
//! prediction-frame shape before the meta tree votes. Stacking can only
//! exploit disagreement between bases; when their predictions are highly
//! correlated (see `eval::pairwise_correlation`) the blend degenerates to
//! the best single base.

use crate::error::{Error, Result};
use crate::model::{cross_validate_cp, Classifier, DecisionTree, Resampling, TrainConfig};
use ndarray::Array2;

/// Base-model predictions zipped with the true labels, shaped like a
/// dataset so the meta model can train on it.
#[derive(Clone, Debug)]
pub struct PredictionFrame {
    /// One column per base model, numeric-encoded predicted labels
    pub features: Array2<f64>,
    /// True labels carried through unchanged
    pub labels: Vec<usize>,
}

/// An ordered list of base classifiers plus one meta decision tree.
#[derive(Debug)]
pub struct Ensemble {
    base: Vec<Box<dyn Classifier>>,
    meta: Option<DecisionTree>,
    meta_config: TrainConfig,
    n_classes: usize,
}

impl Ensemble {
    /// Create an empty ensemble; the meta tree will be tuned and fitted
    /// with `meta_config`.
    pub fn new(meta_config: TrainConfig) -> Self {
        Self {
            base: Vec::new(),
            meta: None,
            meta_config,
            n_classes: 0,
        }
    }

    /// Append a base classifier (fitted or not).
    pub fn push_base(&mut self, model: Box<dyn Classifier>) {
        self.base.push(model);
    }

    /// Base model names, in ensemble order.
    pub fn base_names(&self) -> Vec<String> {
        self.base.iter().map(|m| m.name().to_string()).collect()
    }

    /// The base classifiers, in ensemble order.
    pub fn bases(&self) -> &[Box<dyn Classifier>] {
        &self.base
    }

    /// Fit every base model on the base-training split.
    pub fn fit_base(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        if self.base.is_empty() {
            return Err(Error::Fit("ensemble has no base models".to_string()));
        }
        for model in &mut self.base {
            model.fit(x, y, n_classes)?;
        }
        self.n_classes = n_classes;
        Ok(())
    }

    /// Run every base model over `x` and collect the predictions as one
    /// numeric-encoded column per base.
    fn base_prediction_matrix(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.base.is_empty() {
            return Err(Error::Fit("ensemble has no base models".to_string()));
        }
        let mut features = Array2::zeros((x.nrows(), self.base.len()));
        for (j, model) in self.base.iter().enumerate() {
            for (i, label) in model.predict(x)?.into_iter().enumerate() {
                features[[i, j]] = label as f64;
            }
        }
        Ok(features)
    }

    /// Base predictions on `x` as raw label sequences (for the correlation
    /// diagnostic).
    pub fn base_predictions(&self, x: &Array2<f64>) -> Result<Vec<Vec<usize>>> {
        self.base.iter().map(|m| m.predict(x)).collect()
    }

    /// Assemble the meta training frame from a split disjoint from the base
    /// training split (using the base split here would leak labels into the
    /// meta model through overfit base predictions).
    pub fn build_meta_training_frame(
        &self,
        x: &Array2<f64>,
        y: &[usize],
    ) -> Result<PredictionFrame> {
        let features = self.base_prediction_matrix(x)?;
        Ok(PredictionFrame {
            features,
            labels: y.to_vec(),
        })
    }

    /// Tune and fit the meta decision tree on a prediction frame.
    pub fn fit_meta(&mut self, frame: &PredictionFrame, n_classes: usize) -> Result<()> {
        let cp = match self.meta_config.resampling {
            Resampling::KFoldCv(k) => cross_validate_cp(
                &frame.features,
                &frame.labels,
                n_classes,
                &self.meta_config.cp_grid,
                k,
                self.meta_config.seed,
            )?,
            Resampling::None => self
                .meta_config
                .cp_grid
                .first()
                .copied()
                .ok_or_else(|| Error::Fit("empty complexity-parameter grid".to_string()))?,
        };
        let mut meta = DecisionTree::new(cp);
        meta.fit(&frame.features, &frame.labels, n_classes)?;
        self.meta = Some(meta);
        self.n_classes = n_classes;
        Ok(())
    }
}

impl Classifier for Ensemble {
    fn name(&self) -> &str {
        "stacked ensemble"
    }

    /// Convenience full fit: base models and meta tree on the same split.
    ///
    /// The pipeline does not use this (it trains the meta tree on a
    /// disjoint split); it exists so an `Ensemble` can stand wherever a
    /// plain classifier can.
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        self.fit_base(x, y, n_classes)?;
        let frame = self.build_meta_training_frame(x, y)?;
        self.fit_meta(&frame, n_classes)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let meta = self
            .meta
            .as_ref()
            .ok_or_else(|| Error::Fit("ensemble meta model not fitted".to_string()))?;
        let features = self.base_prediction_matrix(x)?;
        meta.predict(&features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Predicts the same class for every row, ignoring fit entirely.
    #[derive(Debug)]
    struct Constant(usize);

    impl Classifier for Constant {
        fn name(&self) -> &str {
            "constant"
        }
        fn fit(&mut self, _: &Array2<f64>, _: &[usize], _: usize) -> Result<()> {
            Ok(())
        }
        fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
            Ok(vec![self.0; x.nrows()])
        }
    }

    /// Echoes feature 0 as the label.
    #[derive(Debug)]
    struct Oracle;

    impl Classifier for Oracle {
        fn name(&self) -> &str {
            "oracle"
        }
        fn fit(&mut self, _: &Array2<f64>, _: &[usize], _: usize) -> Result<()> {
            Ok(())
        }
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
            Ok((0..x.nrows()).map(|i| x[[i, 0]] as usize).collect())
        }
    }

    fn frame_data(n: usize) -> (Array2<f64>, Vec<usize>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                (i % 3) as f64
            } else {
                ((i * 5) % 7) as f64
            }
        });
        let y: Vec<usize> = (0..n).map(|i| i % 3).collect();
        (x, y)
    }

    fn no_cv_config() -> TrainConfig {
        TrainConfig {
            resampling: Resampling::None,
            cp_grid: vec![0.01],
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_lifecycle_with_oracle_base() {
        let (x, y) = frame_data(60);
        let mut ensemble = Ensemble::new(no_cv_config());
        ensemble.push_base(Box::new(Oracle));
        ensemble.push_base(Box::new(Constant(1)));
        ensemble.fit_base(&x, &y, 3).unwrap();
        let frame = ensemble.build_meta_training_frame(&x, &y).unwrap();
        assert_eq!(frame.features.ncols(), 2);
        assert_eq!(frame.labels, y);
        ensemble.fit_meta(&frame, 3).unwrap();
        // The oracle column fully determines the label; the blend learns it
        assert_eq!(ensemble.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_empty_ensemble_rejected() {
        let (x, y) = frame_data(10);
        let mut ensemble = Ensemble::new(no_cv_config());
        assert!(ensemble.fit_base(&x, &y, 3).is_err());
    }

    #[test]
    fn test_predict_without_meta_errors() {
        let (x, _) = frame_data(10);
        let mut ensemble = Ensemble::new(no_cv_config());
        ensemble.push_base(Box::new(Constant(0)));
        assert!(ensemble.predict(&x).is_err());
    }

    #[test]
    fn test_constant_bases_cannot_invent_information() {
        let (x, y) = frame_data(60);
        // Every base predicts class 2; true labels cycle 0,1,2
        let mut ensemble = Ensemble::new(no_cv_config());
        for _ in 0..3 {
            ensemble.push_base(Box::new(Constant(2)));
        }
        ensemble.fit(&x, &y, 3).unwrap();
        let pred = ensemble.predict(&x).unwrap();
        let acc = pred.iter().zip(&y).filter(|(a, b)| a == b).count() as f64 / y.len() as f64;
        let constant_acc = y.iter().filter(|&&l| l == 2).count() as f64 / y.len() as f64;
        assert!(acc <= constant_acc + 1e-12);
    }

    #[test]
    fn test_base_names_ordered() {
        let mut ensemble = Ensemble::new(no_cv_config());
        ensemble.push_base(Box::new(Oracle));
        ensemble.push_base(Box::new(Constant(0)));
        assert_eq!(ensemble.base_names(), vec!["oracle", "constant"]);
    }

    #[test]
    fn test_meta_frame_is_numeric_encoding() {
        let x = array![[2.0, 9.0], [0.0, 9.0]];
        let y = vec![2, 0];
        let mut ensemble = Ensemble::new(no_cv_config());
        ensemble.push_base(Box::new(Oracle));
        ensemble.fit_base(&x, &y, 3).unwrap();
        let frame = ensemble.build_meta_training_frame(&x, &y).unwrap();
        assert_eq!(frame.features, array![[2.0], [0.0]]);
    }
}
