//! Model evaluation
//!
//! - `classification`: confusion matrix and per-class metrics
//! - [`evaluate`]: accuracy, confusion matrix and importance ranking for a
//!   fitted model against a labeled dataset
//! - [`pairwise_correlation`]: base-model redundancy diagnostic

pub mod classification;

pub use classification::ConfusionMatrix;

use crate::data::Dataset;
use crate::error::Result;
use crate::model::Classifier;
use serde::Serialize;

/// One feature in an importance ranking.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImportanceEntry {
    /// Feature name
    pub feature: String,
    /// Normalized contribution score
    pub score: f64,
}

/// Everything the report needs about one model on one dataset.
#[derive(Clone, Debug, Serialize)]
pub struct Evaluation {
    /// Model name as reported by the classifier
    pub model_name: String,
    /// Fraction of correctly labeled rows, in [0, 1]
    pub accuracy: f64,
    /// `100 * (1 - accuracy)`, the out-of-sample error percentage
    pub out_of_sample_error_pct: f64,
    /// Confusion matrix over the dataset's canonical class ordering
    pub confusion: ConfusionMatrix,
    /// Top-k features by contribution, for models that track importance
    pub importance: Option<Vec<ImportanceEntry>>,
}

/// Evaluate a fitted model against a labeled dataset.
///
/// The importance ranking is truncated to `top_k` entries, sorted by score
/// descending with ties broken by feature name ascending; features with a
/// zero score are excluded. Models without importance (LDA/QDA) report
/// `None`.
pub fn evaluate(
    model: &dyn Classifier,
    dataset: &Dataset,
    top_k: usize,
) -> Result<Evaluation> {
    let predictions = model.predict(dataset.features())?;
    let confusion =
        ConfusionMatrix::from_predictions(&predictions, dataset.labels(), dataset.classes());
    let accuracy = confusion.accuracy();
    let importance = model
        .feature_importance()
        .map(|scores| importance_ranking(dataset.feature_names(), &scores, top_k));

    Ok(Evaluation {
        model_name: model.name().to_string(),
        accuracy,
        out_of_sample_error_pct: 100.0 * (1.0 - accuracy),
        confusion,
        importance,
    })
}

/// Rank features by score: descending, name-ascending on ties, zero scores
/// dropped, truncated to `top_k`.
pub fn importance_ranking(
    names: &[String],
    scores: &[f64],
    top_k: usize,
) -> Vec<ImportanceEntry> {
    let mut entries: Vec<ImportanceEntry> = names
        .iter()
        .zip(scores.iter())
        .filter(|(_, &s)| s > 0.0)
        .map(|(name, &score)| ImportanceEntry {
            feature: name.clone(),
            score,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.feature.cmp(&b.feature))
    });
    entries.truncate(top_k);
    entries
}

/// Pearson correlation matrix between numeric-encoded prediction sequences.
///
/// Identical sequences correlate exactly 1.0. A zero-variance sequence
/// (a constant predictor) carries no signal, so its correlation with any
/// other sequence is defined as 0.0.
pub fn pairwise_correlation(sequences: &[Vec<usize>]) -> Vec<Vec<f64>> {
    let n = sequences.len();
    let mut out = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            out[i][j] = if sequences[i] == sequences[j] {
                1.0
            } else {
                pearson(&sequences[i], &sequences[j])
            };
        }
    }
    out
}

fn pearson(a: &[usize], b: &[usize]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<usize>() as f64 / n;
    let mean_b = b.iter().sum::<usize>() as f64 / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = x as f64 - mean_a;
        let dy = y as f64 - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }
    (cov / (var_a * var_b).sqrt()).clamp(-1.0, 1.0)
}
