//! Dataset types and preparation
//!
//! - `load`: CSV reading with missing-value normalization
//! - `prepare`: window-summary and identifier column filtering
//! - `split`: stratified partitioning and k-fold splitting
//!
//! A [`Dataset`] is immutable once built: the preparer creates it, the
//! partitioner only ever carves row subsets out of it, and the class list is
//! fixed at creation so every derived subset shares the same label encoding.

pub mod load;
pub mod prepare;
pub mod split;

pub use load::{load_csv, RawTable, MISSING};
pub use prepare::prepare;
pub use split::{stratified_split, StratifiedKFold};

use crate::error::{Error, Result};
use ndarray::Array2;

/// An immutable table of numeric features with one categorical label per row.
///
/// Labels are integer-encoded indices into `classes`, the canonical
/// (sorted) class-name list. Every subset derived from a parent dataset
/// carries the parent's full class list, even if some class has no rows in
/// the subset, so label encodings never shift between splits.
#[derive(Clone, Debug)]
pub struct Dataset {
    feature_names: Vec<String>,
    features: Array2<f64>,
    labels: Vec<usize>,
    classes: Vec<String>,
}

impl Dataset {
    /// Build a dataset from parts, validating shape and label range.
    pub fn new(
        feature_names: Vec<String>,
        features: Array2<f64>,
        labels: Vec<usize>,
        classes: Vec<String>,
    ) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(Error::Fit(format!(
                "feature rows ({}) and labels ({}) disagree",
                features.nrows(),
                labels.len()
            )));
        }
        if features.ncols() != feature_names.len() {
            return Err(Error::Fit(format!(
                "feature columns ({}) and names ({}) disagree",
                features.ncols(),
                feature_names.len()
            )));
        }
        if let Some(&bad) = labels.iter().find(|&&l| l >= classes.len()) {
            return Err(Error::Fit(format!(
                "label index {bad} out of range for {} classes",
                classes.len()
            )));
        }
        Ok(Self {
            feature_names,
            features,
            labels,
            classes,
        })
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Number of classes in the canonical class list
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Feature column names
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Feature matrix, rows × features
    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    /// Integer-encoded labels, one per row
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Canonical class names; label `i` means `classes()[i]`
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Row count per class, indexed by label
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for &l in &self.labels {
            counts[l] += 1;
        }
        counts
    }

    /// New dataset holding the given rows, in the given order.
    ///
    /// The class list is carried through unchanged.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut features = Array2::zeros((indices.len(), self.n_features()));
        let mut labels = Vec::with_capacity(indices.len());
        for (out, &idx) in indices.iter().enumerate() {
            features.row_mut(out).assign(&self.features.row(idx));
            labels.push(self.labels[idx]);
        }
        Self {
            feature_names: self.feature_names.clone(),
            features,
            labels,
            classes: self.classes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_class() -> Dataset {
        Dataset::new(
            vec!["a".into(), "b".into()],
            array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
            vec![0, 1, 0],
            vec!["no".into(), "yes".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_shape_accessors() {
        let ds = two_class();
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.n_classes(), 2);
        assert_eq!(ds.class_counts(), vec![2, 1]);
    }

    #[test]
    fn test_select_rows_keeps_class_list() {
        let ds = two_class();
        let sub = ds.select_rows(&[2, 0]);
        assert_eq!(sub.n_rows(), 2);
        assert_eq!(sub.labels(), &[0, 0]);
        // class "yes" has no rows in the subset but stays in the encoding
        assert_eq!(sub.n_classes(), 2);
        assert_eq!(sub.features()[[0, 0]], 5.0);
    }

    #[test]
    fn test_mismatched_shapes_rejected() {
        let res = Dataset::new(
            vec!["a".into()],
            array![[1.0], [2.0]],
            vec![0],
            vec!["x".into()],
        );
        assert!(res.is_err());

        let res = Dataset::new(
            vec!["a".into()],
            array![[1.0], [2.0]],
            vec![0, 3],
            vec!["x".into()],
        );
        assert!(res.is_err());
    }
}
