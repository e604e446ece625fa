//! Stratified partitioning
//!
//! Both splitters sample within each class so that class-size skew never
//! starves a subset of a label. All shuffling goes through a caller-supplied
//! seeded [`StdRng`]; the same seed and input produce bit-identical
//! partitions on every run.

use super::Dataset;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Stratified two-way split.
///
/// Within each class, `round(fraction * n_class)` shuffled rows go to part A
/// and the remainder to part B, so both parts hold every class in roughly
/// the parent's proportions. Returns [`Error::InsufficientData`] if any
/// class present in the parent would land zero rows on either side.
pub fn stratified_split(
    dataset: &Dataset,
    fraction: f64,
    rng: &mut StdRng,
) -> Result<(Dataset, Dataset)> {
    let mut part_a = Vec::new();
    let mut part_b = Vec::new();

    for class in 0..dataset.n_classes() {
        let mut indices: Vec<usize> = dataset
            .labels()
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            continue;
        }

        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let n_a = (fraction * indices.len() as f64).round() as usize;
        let (class_name, part) = if n_a == 0 {
            (dataset.classes()[class].clone(), "part_a")
        } else if n_a == indices.len() {
            (dataset.classes()[class].clone(), "part_b")
        } else {
            indices.shuffle(rng);
            part_a.extend_from_slice(&indices[..n_a]);
            part_b.extend_from_slice(&indices[n_a..]);
            continue;
        };
        return Err(Error::InsufficientData {
            class: class_name,
            part: part.to_string(),
        });
    }

    // Stable row order in both parts, independent of shuffle order
    part_a.sort_unstable();
    part_b.sort_unstable();

    Ok((dataset.select_rows(&part_a), dataset.select_rows(&part_b)))
}

/// Stratified k-fold splitter for cross-validation.
///
/// Rows of each class are shuffled once and dealt round-robin across folds,
/// so every fold's training side contains every class (each class needs at
/// least two rows for that to hold; fewer is a fit error).
#[derive(Clone, Debug)]
pub struct StratifiedKFold {
    n_splits: usize,
    seed: u64,
}

impl StratifiedKFold {
    /// Create a splitter with `n_splits` folds
    pub fn new(n_splits: usize, seed: u64) -> Self {
        Self { n_splits, seed }
    }

    /// Generate (train_indices, test_indices) per fold.
    pub fn split(
        &self,
        labels: &[usize],
        n_classes: usize,
    ) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut fold_of = vec![0usize; labels.len()];

        for class in 0..n_classes {
            let mut indices: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|(_, &l)| l == class)
                .map(|(i, _)| i)
                .collect();
            if indices.is_empty() {
                continue;
            }
            if indices.len() < 2 {
                return Err(Error::Fit(format!(
                    "class index {class} has {} row(s); cross-validation needs at least 2",
                    indices.len()
                )));
            }
            indices.shuffle(&mut rng);
            for (pos, &row) in indices.iter().enumerate() {
                fold_of[row] = pos % self.n_splits;
            }
        }

        let mut folds = Vec::with_capacity(self.n_splits);
        for f in 0..self.n_splits {
            let test: Vec<usize> = (0..labels.len()).filter(|&i| fold_of[i] == f).collect();
            let train: Vec<usize> = (0..labels.len()).filter(|&i| fold_of[i] != f).collect();
            folds.push((train, test));
        }
        Ok(folds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn balanced(n_per_class: usize, n_classes: usize) -> Dataset {
        let n = n_per_class * n_classes;
        let features = Array2::from_shape_fn((n, 2), |(i, j)| (i * 2 + j) as f64);
        let labels: Vec<usize> = (0..n).map(|i| i % n_classes).collect();
        let classes = (0..n_classes).map(|c| format!("C{c}")).collect();
        Dataset::new(vec!["f0".into(), "f1".into()], features, labels, classes).unwrap()
    }

    #[test]
    fn test_split_sizes_and_disjointness() {
        let ds = balanced(10, 3);
        let mut rng = StdRng::seed_from_u64(7);
        let (a, b) = stratified_split(&ds, 0.7, &mut rng).unwrap();
        assert_eq!(a.n_rows(), 21);
        assert_eq!(b.n_rows(), 9);
        assert_eq!(a.class_counts(), vec![7, 7, 7]);
        assert_eq!(b.class_counts(), vec![3, 3, 3]);
    }

    #[test]
    fn test_split_deterministic() {
        let ds = balanced(10, 3);
        let (a1, _) = stratified_split(&ds, 0.7, &mut StdRng::seed_from_u64(9)).unwrap();
        let (a2, _) = stratified_split(&ds, 0.7, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a1.features(), a2.features());
        assert_eq!(a1.labels(), a2.labels());
    }

    #[test]
    fn test_split_fails_on_starved_class() {
        let ds = balanced(1, 2);
        let mut rng = StdRng::seed_from_u64(1);
        let err = stratified_split(&ds, 0.7, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { .. }));
    }

    #[test]
    fn test_kfold_covers_every_row_once() {
        let ds = balanced(10, 3);
        let folds = StratifiedKFold::new(5, 3).split(ds.labels(), 3).unwrap();
        assert_eq!(folds.len(), 5);
        let mut seen = vec![0usize; ds.n_rows()];
        for (train, test) in &folds {
            assert_eq!(train.len() + test.len(), ds.n_rows());
            for &i in test {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_kfold_train_side_has_every_class() {
        let ds = balanced(4, 3);
        let folds = StratifiedKFold::new(4, 11).split(ds.labels(), 3).unwrap();
        for (train, _) in &folds {
            for class in 0..3 {
                assert!(train.iter().any(|&i| ds.labels()[i] == class));
            }
        }
    }

    #[test]
    fn test_kfold_singleton_class_is_fit_error() {
        let labels = vec![0, 0, 0, 1];
        let err = StratifiedKFold::new(2, 1).split(&labels, 2).unwrap_err();
        assert!(matches!(err, Error::Fit(_)));
    }
}
