//! CART decision tree
//!
//! Greedy recursive partitioning on Gini impurity. Growth is gated by an
//! rpart-style complexity parameter: a split is kept only if its total
//! impurity decrease is at least `cp` times the root impurity, so `cp`
//! doubles as the pruning knob the cross-validated search in [`super::tune`]
//! selects. Per-feature impurity decreases are accumulated into the
//! importance vector.

use super::Classifier;
use crate::error::{Error, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Clone, Debug)]
enum Node {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted or unfitted CART decision tree.
#[derive(Clone, Debug)]
pub struct DecisionTree {
    cp: f64,
    max_depth: usize,
    min_samples_split: usize,
    /// Features considered per split; `None` means all of them
    mtry: Option<usize>,
    seed: u64,
    nodes: Vec<Node>,
    importance: Vec<f64>,
    fitted: bool,
}

impl DecisionTree {
    /// Create an unfitted tree with the given complexity parameter.
    pub fn new(cp: f64) -> Self {
        Self {
            cp,
            max_depth: 30,
            min_samples_split: 2,
            mtry: None,
            seed: 0,
            nodes: Vec::new(),
            importance: Vec::new(),
            fitted: false,
        }
    }

    /// Limit each split to a random subset of `mtry` features (forest mode).
    pub fn with_feature_subsample(mut self, mtry: usize, seed: u64) -> Self {
        self.mtry = Some(mtry);
        self.seed = seed;
        self
    }

    /// Complexity parameter this tree was built with
    pub fn cp(&self) -> f64 {
        self.cp
    }

    /// Raw (unnormalized) per-feature impurity decrease
    pub(crate) fn raw_importance(&self) -> &[f64] {
        &self.importance
    }

    fn leaf(counts: &[usize]) -> Node {
        let mut best = 0;
        for (k, &c) in counts.iter().enumerate() {
            if c > counts[best] {
                best = k;
            }
        }
        Node::Leaf { class: best }
    }

    /// Recursively grow the subtree over `indices`, returning its node id.
    #[allow(clippy::too_many_arguments)]
    fn grow(
        &mut self,
        x: &Array2<f64>,
        y: &[usize],
        n_classes: usize,
        indices: &[usize],
        depth: usize,
        min_gain: f64,
        rng: &mut StdRng,
    ) -> usize {
        let mut counts = vec![0usize; n_classes];
        for &i in indices {
            counts[y[i]] += 1;
        }
        let node_impurity = gini_total(&counts, indices.len());

        let splittable = depth < self.max_depth
            && indices.len() >= self.min_samples_split
            && node_impurity > 0.0;
        let best = if splittable {
            self.best_split(x, y, n_classes, indices, node_impurity, rng)
        } else {
            None
        };

        match best {
            Some(split) if split.gain >= min_gain => {
                self.importance[split.feature] += split.gain;
                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[[i, split.feature]] <= split.threshold);
                let id = self.nodes.len();
                // Placeholder, patched once both children exist
                self.nodes.push(Node::Leaf { class: 0 });
                let left = self.grow(x, y, n_classes, &left_idx, depth + 1, min_gain, rng);
                let right = self.grow(x, y, n_classes, &right_idx, depth + 1, min_gain, rng);
                self.nodes[id] = Node::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left,
                    right,
                };
                id
            }
            _ => {
                let id = self.nodes.len();
                self.nodes.push(Self::leaf(&counts));
                id
            }
        }
    }

    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &[usize],
        n_classes: usize,
        indices: &[usize],
        node_impurity: f64,
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let p = x.ncols();
        let mut features: Vec<usize> = (0..p).collect();
        if let Some(mtry) = self.mtry {
            features.shuffle(rng);
            features.truncate(mtry.max(1).min(p));
            features.sort_unstable();
        }

        let mut best: Option<SplitCandidate> = None;
        for &feature in &features {
            let mut ordered: Vec<(f64, usize)> =
                indices.iter().map(|&i| (x[[i, feature]], y[i])).collect();
            ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let n = ordered.len();
            let mut left_counts = vec![0usize; n_classes];
            let mut right_counts = vec![0usize; n_classes];
            for &(_, label) in &ordered {
                right_counts[label] += 1;
            }

            for i in 1..n {
                let (prev_value, prev_label) = ordered[i - 1];
                left_counts[prev_label] += 1;
                right_counts[prev_label] -= 1;
                let value = ordered[i].0;
                if value <= prev_value {
                    continue;
                }
                let children =
                    gini_total(&left_counts, i) + gini_total(&right_counts, n - i);
                let gain = node_impurity - children;
                let better = best.as_ref().map_or(true, |b| gain > b.gain);
                if gain > 0.0 && better {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: 0.5 * (prev_value + value),
                        gain,
                    });
                }
            }
        }
        best
    }

    fn predict_row(&self, x: &Array2<f64>, row: usize) -> usize {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { class } => return *class,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if x[[row, *feature]] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Gini impurity scaled by the row count of the node: `n * (1 - Σ p_k²)`.
///
/// Totals (rather than per-row averages) make parent-minus-children gains
/// directly comparable across nodes of different sizes.
fn gini_total(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n_f = n as f64;
    let sum_sq: f64 = counts.iter().map(|&c| (c as f64).powi(2)).sum();
    n_f * (1.0 - sum_sq / (n_f * n_f))
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl Classifier for DecisionTree {
    fn name(&self) -> &str {
        "decision tree"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        if x.nrows() == 0 {
            return Err(Error::Fit("empty training data".to_string()));
        }
        if x.nrows() != y.len() {
            return Err(Error::Fit(format!(
                "feature rows ({}) and labels ({}) disagree",
                x.nrows(),
                y.len()
            )));
        }

        self.nodes.clear();
        self.importance = vec![0.0; x.ncols()];

        let indices: Vec<usize> = (0..x.nrows()).collect();
        let mut counts = vec![0usize; n_classes];
        for &label in y {
            counts[label] += 1;
        }
        let root_impurity = gini_total(&counts, indices.len());
        let min_gain = (self.cp * root_impurity).max(f64::EPSILON);

        let mut rng = StdRng::seed_from_u64(self.seed);
        self.grow(x, y, n_classes, &indices, 0, min_gain, &mut rng);
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        if !self.fitted {
            return Err(Error::Fit("decision tree not fitted".to_string()));
        }
        Ok((0..x.nrows()).map(|i| self.predict_row(x, i)).collect())
    }

    fn feature_importance(&self) -> Option<Vec<f64>> {
        if !self.fitted {
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

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn xor_free() -> (Array2<f64>, Vec<usize>) {
        // Feature 0 determines the class, feature 1 is constant noise
        let x = array![
            [0.0, 5.0],
            [0.1, 5.0],
            [0.9, 5.0],
            [1.0, 5.0],
            [0.05, 5.0],
            [0.95, 5.0],
        ];
        let y = vec![0, 0, 1, 1, 0, 1];
        (x, y)
    }

    #[test]
    fn test_fits_separable_data_exactly() {
        let (x, y) = xor_free();
        let mut tree = DecisionTree::new(0.01);
        tree.fit(&x, &y, 2).unwrap();
        assert_eq!(tree.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_importance_ignores_constant_feature() {
        let (x, y) = xor_free();
        let mut tree = DecisionTree::new(0.01);
        tree.fit(&x, &y, 2).unwrap();
        let imp = tree.feature_importance().unwrap();
        assert!(imp[0] > 0.0);
        assert_eq!(imp[1], 0.0);
    }

    #[test]
    fn test_high_cp_collapses_to_stump_or_leaf() {
        let (x, y) = xor_free();
        let mut loose = DecisionTree::new(0.0001);
        loose.fit(&x, &y, 2).unwrap();
        let mut strict = DecisionTree::new(1.1);
        strict.fit(&x, &y, 2).unwrap();
        // cp > 1 forbids every split; the tree predicts the majority class
        assert_eq!(strict.nodes.len(), 1);
        assert!(loose.nodes.len() > strict.nodes.len());
    }

    #[test]
    fn test_pure_node_stops_growing() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = vec![1, 1, 1];
        let mut tree = DecisionTree::new(0.01);
        tree.fit(&x, &y, 2).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_empty_input_is_fit_error() {
        let x = Array2::<f64>::zeros((0, 3));
        let mut tree = DecisionTree::new(0.01);
        assert!(tree.fit(&x, &[], 2).is_err());
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let tree = DecisionTree::new(0.01);
        assert!(tree.predict(&array![[1.0]]).is_err());
    }
}
