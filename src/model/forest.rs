//! Random forest
//!
//! Bagging over fully grown CART trees: each tree fits a bootstrap sample
//! of the training rows and considers only √p randomly chosen features per
//! split. Prediction is a majority vote; importance is the per-tree
//! impurity decrease averaged across the forest. Per-tree seeds are derived
//! from the forest seed, so the whole fit is reproducible.

use super::tree::DecisionTree;
use super::Classifier;
use crate::error::{Error, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// Random forest classifier.
#[derive(Debug)]
pub struct RandomForest {
    n_trees: usize,
    seed: u64,
    n_classes: usize,
    trees: Vec<DecisionTree>,
    importance: Vec<f64>,
}

impl RandomForest {
    /// Create an unfitted forest of `n_trees` trees.
    pub fn new(n_trees: usize, seed: u64) -> Self {
        Self {
            n_trees,
            seed,
            n_classes: 0,
            trees: Vec::new(),
            importance: Vec::new(),
        }
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &str {
        "random forest"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        if self.n_trees == 0 {
            return Err(Error::Fit("forest needs at least one tree".to_string()));
        }
        if x.nrows() == 0 {
            return Err(Error::Fit("empty training data".to_string()));
        }

        let n = x.nrows();
        let p = x.ncols();
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let mtry = (p as f64).sqrt().round().max(1.0) as usize;

        let mut rng = StdRng::seed_from_u64(self.seed);
        self.trees = Vec::with_capacity(self.n_trees);
        self.importance = vec![0.0; p];

        for _ in 0..self.n_trees {
            let sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
            let xs = super::take_rows(x, &sample);
            let ys: Vec<usize> = sample.iter().map(|&i| y[i]).collect();

            let tree_seed: u64 = rng.random();
            let mut tree = DecisionTree::new(0.0).with_feature_subsample(mtry, tree_seed);
            tree.fit(&xs, &ys, n_classes)?;
            for (j, &g) in tree.raw_importance().iter().enumerate() {
                self.importance[j] += g;
            }
            self.trees.push(tree);
        }

        for v in &mut self.importance {
            *v /= self.n_trees as f64;
        }
        self.n_classes = n_classes;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        if self.trees.is_empty() {
            return Err(Error::Fit("random forest not fitted".to_string()));
        }
        let mut votes = vec![vec![0usize; self.n_classes]; x.nrows()];
        for tree in &self.trees {
            for (i, label) in tree.predict(x)?.into_iter().enumerate() {
                votes[i][label] += 1;
            }
        }
        Ok(votes
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (k, &v) in row.iter().enumerate() {
                    if v > row[best] {
                        best = k;
                    }
                }
                best
            })
            .collect())
    }

    fn feature_importance(&self) -> Option<Vec<f64>> {
        if self.trees.is_empty() {
            return None;
        }
        let total: f64 = self.importance.iter().sum();
        if total > 0.0 {
            Some(self.importance.iter().map(|v| v / total).collect())
        } else {
            Some(self.importance.clone())
        }
    }
}
