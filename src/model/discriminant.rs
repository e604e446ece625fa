//! Gaussian discriminant classifiers
//!
//! Linear discriminant analysis pools one covariance matrix across classes;
//! quadratic discriminant analysis estimates one per class. Both are
//! deterministic fits with no hyperparameters. A singular covariance matrix
//! is an unrecoverable [`Error::Convergence`] and propagates unchanged.

use super::Classifier;
use crate::error::{Error, Result};
use ndarray::{Array1, Array2};

/// Invert a square matrix by Gauss-Jordan elimination with partial
/// pivoting, also returning the log of the absolute determinant.
fn invert_logdet(m: &Array2<f64>) -> Result<(Array2<f64>, f64)> {
    let n = m.nrows();
    let mut a = m.clone();
    let mut inv = Array2::eye(n);
    let mut log_det = 0.0;

    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if a[[row, col]].abs() > a[[pivot, col]].abs() {
                pivot = row;
            }
        }
        let pivot_val = a[[pivot, col]];
        if pivot_val.abs() < 1e-12 {
            return Err(Error::Convergence(
                "singular covariance matrix".to_string(),
            ));
        }
        if pivot != col {
            for j in 0..n {
                a.swap([pivot, j], [col, j]);
                inv.swap([pivot, j], [col, j]);
            }
        }
        log_det += pivot_val.abs().ln();
        for j in 0..n {
            a[[col, j]] /= pivot_val;
            inv[[col, j]] /= pivot_val;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                a[[row, j]] -= factor * a[[col, j]];
                inv[[row, j]] -= factor * inv[[col, j]];
            }
        }
    }

    Ok((inv, log_det))
}

/// Per-class means, counts and priors shared by both discriminant fits.
struct ClassMoments {
    means: Array2<f64>,
    counts: Vec<usize>,
    log_priors: Vec<f64>,
}

fn class_moments(x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<ClassMoments> {
    let n = x.nrows();
    let p = x.ncols();
    let mut counts = vec![0usize; n_classes];
    let mut means = Array2::zeros((n_classes, p));
    for (i, &label) in y.iter().enumerate() {
        counts[label] += 1;
        for j in 0..p {
            means[[label, j]] += x[[i, j]];
        }
    }
    for (k, &count) in counts.iter().enumerate() {
        if count == 0 {
            return Err(Error::Fit(format!(
                "class index {k} absent from training data"
            )));
        }
        for j in 0..p {
            means[[k, j]] /= count as f64;
        }
    }
    let log_priors = counts
        .iter()
        .map(|&c| (c as f64 / n as f64).ln())
        .collect();
    Ok(ClassMoments {
        means,
        counts,
        log_priors,
    })
}

fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (k, &s) in scores.iter().enumerate() {
        if s > scores[best] {
            best = k;
        }
    }
    best
}

#[derive(Debug)]
struct LdaState {
    /// One row per class: Σ⁻¹ μ_k
    coef: Array2<f64>,
    intercept: Vec<f64>,
}

/// Linear discriminant analysis classifier.
#[derive(Debug, Default)]
pub struct LinearDiscriminant {
    state: Option<LdaState>,
}

impl LinearDiscriminant {
    /// Create an unfitted LDA model
    pub fn new() -> Self {
        Self::default()
    }
}

impl Classifier for LinearDiscriminant {
    fn name(&self) -> &str {
        "linear discriminant"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        let n = x.nrows();
        let p = x.ncols();
        let moments = class_moments(x, y, n_classes)?;
        if n <= n_classes {
            return Err(Error::Fit(format!(
                "{n} rows cannot support a pooled covariance over {n_classes} classes"
            )));
        }

        let mut pooled = Array2::zeros((p, p));
        for (i, &label) in y.iter().enumerate() {
            let centered: Array1<f64> =
                (0..p).map(|j| x[[i, j]] - moments.means[[label, j]]).collect();
            for a in 0..p {
                for b in 0..p {
                    pooled[[a, b]] += centered[a] * centered[b];
                }
            }
        }
        pooled.mapv_inplace(|v| v / (n - n_classes) as f64);

        let (inv, _) = invert_logdet(&pooled)?;
        let mut coef = Array2::zeros((n_classes, p));
        let mut intercept = Vec::with_capacity(n_classes);
        for k in 0..n_classes {
            let mu = moments.means.row(k);
            let w = inv.dot(&mu);
            let b = -0.5 * mu.dot(&w) + moments.log_priors[k];
            coef.row_mut(k).assign(&w);
            intercept.push(b);
        }
        self.state = Some(LdaState { coef, intercept });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| Error::Fit("linear discriminant not fitted".to_string()))?;
        let scores = x.dot(&state.coef.t());
        Ok((0..x.nrows())
            .map(|i| {
                let row: Vec<f64> = (0..state.intercept.len())
                    .map(|k| scores[[i, k]] + state.intercept[k])
                    .collect();
                argmax(&row)
            })
            .collect())
    }
}

#[derive(Debug)]
struct QdaClass {
    mean: Array1<f64>,
    inv_cov: Array2<f64>,
    log_det: f64,
    log_prior: f64,
}

/// Quadratic discriminant analysis classifier.
#[derive(Debug, Default)]
pub struct QuadraticDiscriminant {
    classes: Option<Vec<QdaClass>>,
}

impl QuadraticDiscriminant {
    /// Create an unfitted QDA model
    pub fn new() -> Self {
        Self::default()
    }
}

impl Classifier for QuadraticDiscriminant {
    fn name(&self) -> &str {
        "quadratic discriminant"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        let p = x.ncols();
        let moments = class_moments(x, y, n_classes)?;

        let mut classes = Vec::with_capacity(n_classes);
        for k in 0..n_classes {
            if moments.counts[k] < 2 {
                return Err(Error::Fit(format!(
                    "class index {k} has {} row(s); covariance needs at least 2",
                    moments.counts[k]
                )));
            }
            let mut cov = Array2::zeros((p, p));
            for (i, &label) in y.iter().enumerate() {
                if label != k {
                    continue;
                }
                let centered: Array1<f64> =
                    (0..p).map(|j| x[[i, j]] - moments.means[[k, j]]).collect();
                for a in 0..p {
                    for b in 0..p {
                        cov[[a, b]] += centered[a] * centered[b];
                    }
                }
            }
            cov.mapv_inplace(|v| v / (moments.counts[k] - 1) as f64);
            let (inv_cov, log_det) = invert_logdet(&cov)?;
            classes.push(QdaClass {
                mean: moments.means.row(k).to_owned(),
                inv_cov,
                log_det,
                log_prior: moments.log_priors[k],
            });
        }
        self.classes = Some(classes);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let classes = self
            .classes
            .as_ref()
            .ok_or_else(|| Error::Fit("quadratic discriminant not fitted".to_string()))?;
        Ok((0..x.nrows())
            .map(|i| {
                let row = x.row(i);
                let scores: Vec<f64> = classes
                    .iter()
                    .map(|c| {
                        let centered = &row - &c.mean;
                        let quad = centered.dot(&c.inv_cov.dot(&centered));
                        -0.5 * c.log_det - 0.5 * quad + c.log_prior
                    })
                    .collect();
                argmax(&scores)
            })
            .collect())
    }
}
