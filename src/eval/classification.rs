//! Confusion matrix and per-class metrics

use serde::Serialize;
use std::fmt;

/// Confusion matrix over a fixed canonical class ordering.
///
/// `matrix[true][pred]` counts rows with that (true, predicted) pair. The
/// dimension is the dataset's class count, not the set of labels that
/// happened to appear, so matrices from different splits of one dataset are
/// always comparable cell by cell.
#[derive(Clone, Debug, Serialize)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    classes: Vec<String>,
}

impl ConfusionMatrix {
    /// Build from aligned prediction and truth sequences.
    ///
    /// Both sequences must contain label indices below `classes.len()`;
    /// lengths must match.
    pub fn from_predictions(y_pred: &[usize], y_true: &[usize], classes: &[String]) -> Self {
        assert_eq!(
            y_pred.len(),
            y_true.len(),
            "predictions and truth must have the same length"
        );
        let n = classes.len();
        let mut matrix = vec![vec![0usize; n]; n];
        for (&pred, &truth) in y_pred.iter().zip(y_true.iter()) {
            matrix[truth][pred] += 1;
        }
        Self {
            matrix,
            classes: classes.to_vec(),
        }
    }

    /// Number of classes (matrix dimension)
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Class names in canonical order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Count at `[true_label][predicted_label]`
    pub fn get(&self, true_label: usize, predicted_label: usize) -> usize {
        self.matrix[true_label][predicted_label]
    }

    /// Per-class true-row counts (row sums)
    pub fn row_sums(&self) -> Vec<usize> {
        self.matrix.iter().map(|row| row.iter().sum()).collect()
    }

    /// Total rows counted
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Fraction of rows on the diagonal; 0.0 for an empty matrix
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes()).map(|k| self.matrix[k][k]).sum();
        correct as f64 / total as f64
    }

    /// Precision for one class: TP / (TP + FP), 0.0 when nothing was
    /// predicted as that class
    pub fn precision(&self, class: usize) -> f64 {
        let predicted: usize = (0..self.n_classes()).map(|i| self.matrix[i][class]).sum();
        if predicted == 0 {
            return 0.0;
        }
        self.matrix[class][class] as f64 / predicted as f64
    }

    /// Recall for one class: TP / (TP + FN), 0.0 when the class has no rows
    pub fn recall(&self, class: usize) -> f64 {
        let actual: usize = self.matrix[class].iter().sum();
        if actual == 0 {
            return 0.0;
        }
        self.matrix[class][class] as f64 / actual as f64
    }

    /// Harmonic mean of precision and recall, 0.0 when both are zero
    pub fn f1(&self, class: usize) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(1)
            .max(6);

        write!(f, "{:>width$} │", "true\\pred")?;
        for class in &self.classes {
            write!(f, " {class:>width$}")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:─>w1$}┼{:─>w2$}",
            "",
            "",
            w1 = width + 1,
            w2 = (width + 1) * self.classes.len()
        )?;
        for (i, class) in self.classes.iter().enumerate() {
            write!(f, "{class:>width$} │")?;
            for j in 0..self.classes.len() {
                write!(f, " {:>width$}", self.matrix[i][j])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
