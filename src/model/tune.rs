//! Complexity-parameter selection by cross-validation
//!
//! Evaluates every value of the `cp` grid over the same stratified k-fold
//! split and returns the value with the highest mean held-out accuracy.
//! Ties go to the largest `cp` (the simplest tree).

use super::tree::DecisionTree;
use super::{take_rows, Classifier};
use crate::data::StratifiedKFold;
use crate::error::{Error, Result};
use ndarray::Array2;

const TIE_EPS: f64 = 1e-12;

/// Pick the best complexity parameter for a decision tree on `(x, y)`.
///
/// Folds are stratified by class; a class too small to stratify is a
/// [`Error::Fit`] (a fold would be unable to evaluate it). Fold accuracies
/// are combined by a plain mean, so fold order is irrelevant.
pub fn cross_validate_cp(
    x: &Array2<f64>,
    y: &[usize],
    n_classes: usize,
    grid: &[f64],
    k: usize,
    seed: u64,
) -> Result<f64> {
    if grid.is_empty() {
        return Err(Error::Fit("empty complexity-parameter grid".to_string()));
    }
    if k < 2 {
        return Err(Error::Fit(format!(
            "cross-validation needs at least 2 folds, got {k}"
        )));
    }

    let folds = StratifiedKFold::new(k, seed).split(y, n_classes)?;

    let mut best_cp = grid[0];
    let mut best_mean = f64::NEG_INFINITY;
    for &cp in grid {
        let mut fold_accuracy = Vec::with_capacity(folds.len());
        for (train, test) in &folds {
            let x_train = take_rows(x, train);
            let y_train: Vec<usize> = train.iter().map(|&i| y[i]).collect();
            let x_test = take_rows(x, test);

            let mut tree = DecisionTree::new(cp);
            tree.fit(&x_train, &y_train, n_classes)?;
            let pred = tree.predict(&x_test)?;

            let correct = pred
                .iter()
                .zip(test.iter())
                .filter(|&(&p, &i)| p == y[i])
                .count();
            fold_accuracy.push(correct as f64 / test.len().max(1) as f64);
        }
        let mean: f64 = fold_accuracy.iter().sum::<f64>() / fold_accuracy.len() as f64;

        let improved = mean > best_mean + TIE_EPS;
        let tied_but_simpler = (mean - best_mean).abs() <= TIE_EPS && cp > best_cp;
        if improved || tied_but_simpler {
            best_mean = mean;
            best_cp = cp;
        }
    }
    Ok(best_cp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Feature 0 fully determines the class; feature 1 is noise.
    fn separable(n: usize) -> (Array2<f64>, Vec<usize>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                (i % 4) as f64
            } else {
                ((i * 31) % 17) as f64
            }
        });
        let y: Vec<usize> = (0..n).map(|i| i % 4).collect();
        (x, y)
    }

    #[test]
    fn test_selects_a_grid_value() {
        let (x, y) = separable(80);
        let grid = [0.001, 0.01, 0.1];
        let cp = cross_validate_cp(&x, &y, 4, &grid, 5, 3).unwrap();
        assert!(grid.contains(&cp));
    }

    #[test]
    fn test_ties_prefer_largest_cp() {
        // Perfectly separable: every cp below 1.0 scores identically,
        // so the simplest (largest) value must win.
        let (x, y) = separable(80);
        let grid = [0.0001, 0.001, 0.01];
        let cp = cross_validate_cp(&x, &y, 4, &grid, 5, 3).unwrap();
        assert_eq!(cp, 0.01);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let (x, y) = separable(60);
        let grid = [0.001, 0.05];
        let a = cross_validate_cp(&x, &y, 4, &grid, 5, 9).unwrap();
        let b = cross_validate_cp(&x, &y, 4, &grid, 5, 9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_grid_rejected() {
        let (x, y) = separable(40);
        assert!(cross_validate_cp(&x, &y, 4, &[], 5, 1).is_err());
    }

    #[test]
    fn test_tiny_class_rejected() {
        let x = Array2::zeros((5, 1));
        let y = vec![0, 0, 0, 0, 1];
        let err = cross_validate_cp(&x, &y, 2, &[0.01], 5, 1).unwrap_err();
        assert!(matches!(err, Error::Fit(_)));
    }
}
