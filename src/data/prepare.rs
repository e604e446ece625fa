//! Raw-table preparation
//!
//! The sensor export interleaves two kinds of rows: per-instant readings and
//! window-summary rows carrying aggregate statistics (marked by the
//! `new_window` flag). Summary rows, and the columns that only those rows
//! populate, are not valid predictive features for a model meant to
//! generalize across subjects and time, so both are stripped here before any
//! model ever sees the data.

use super::load::{RawTable, MISSING};
use super::Dataset;
use crate::error::{Error, Result};
use ndarray::Array2;

/// Identifier columns: row index, subject, window bookkeeping
const IDENTIFIER_COLUMNS: [&str; 4] = ["X", "user_name", "new_window", "num_window"];

/// Name prefixes of per-window summary-statistic columns
const SUMMARY_PREFIXES: [&str; 8] = [
    "kurtosis_",
    "skewness_",
    "max_",
    "min_",
    "amplitude_",
    "avg_",
    "var_",
    "stddev_",
];

/// Column flagging window-summary rows
const WINDOW_FLAG_COLUMN: &str = "new_window";
const WINDOW_FLAG_VALUE: &str = "yes";

fn is_dropped_column(name: &str) -> bool {
    IDENTIFIER_COLUMNS.contains(&name)
        || name.contains("timestamp")
        || SUMMARY_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Turn a raw table into a modeling-ready [`Dataset`].
///
/// Drops window-summary rows and rows with a missing label, then drops
/// identifier, timestamp, and summary-statistic columns, then drops any
/// remaining column that still contains a missing value. Fails with
/// [`Error::Schema`] if `label_column` is absent. Pure transform; the input
/// table is not modified.
pub fn prepare(table: &RawTable, label_column: &str) -> Result<Dataset> {
    let label_idx = table
        .column_index(label_column)
        .ok_or_else(|| Error::Schema(label_column.to_string()))?;
    let window_idx = table.column_index(WINDOW_FLAG_COLUMN);

    let kept_rows: Vec<&Vec<String>> = table
        .rows
        .iter()
        .filter(|row| {
            let summary = window_idx.is_some_and(|w| row[w] == WINDOW_FLAG_VALUE);
            !summary && row[label_idx] != MISSING
        })
        .collect();

    // Candidate feature columns by name, before sparseness filtering
    let candidates: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, name)| *i != label_idx && !is_dropped_column(name))
        .map(|(i, _)| i)
        .collect();

    // Parse candidates column-wise; a column with any missing or
    // non-numeric cell is a sparse summary leftover and gets dropped whole.
    let mut feature_names = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();
    for &col in &candidates {
        let parsed: Option<Vec<f64>> = kept_rows
            .iter()
            .map(|row| {
                let cell = &row[col];
                if cell == MISSING {
                    None
                } else {
                    cell.parse::<f64>().ok()
                }
            })
            .collect();
        if let Some(values) = parsed {
            feature_names.push(table.headers[col].clone());
            columns.push(values);
        }
    }

    let mut classes: Vec<String> = kept_rows
        .iter()
        .map(|row| row[label_idx].clone())
        .collect();
    classes.sort();
    classes.dedup();

    let labels: Vec<usize> = kept_rows
        .iter()
        .map(|row| {
            classes
                .binary_search(&row[label_idx])
                .unwrap_or_default()
        })
        .collect();

    let n_rows = kept_rows.len();
    let n_features = columns.len();
    let mut features = Array2::zeros((n_rows, n_features));
    for (j, col) in columns.iter().enumerate() {
        for (i, &v) in col.iter().enumerate() {
            features[[i, j]] = v;
        }
    }

    Dataset::new(feature_names, features, labels, classes)
}
