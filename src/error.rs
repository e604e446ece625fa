//! Pipeline error types

use thiserror::Error;

/// Errors raised by any stage of the classification pipeline.
///
/// Every stage is deterministic given its seed, so no error is retried:
/// all variants propagate to the caller and abort the run.
#[derive(Debug, Error)]
pub enum Error {
    /// An expected column is missing from the input schema
    #[error("schema error: column '{0}' not found")]
    Schema(String),

    /// A class would receive zero rows on one side of a partition
    #[error("insufficient data: class '{class}' has no rows in {part}")]
    InsufficientData {
        /// Class name that would be lost
        class: String,
        /// Which partition side is missing it
        part: String,
    },

    /// Degenerate training input (e.g. a cross-validation fold missing a class)
    #[error("fit error: {0}")]
    Fit(String),

    /// Unrecoverable algorithm-internal failure (e.g. singular covariance)
    #[error("convergence failure: {0}")]
    Convergence(String),

    /// Malformed input file
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number in the input file
        line: usize,
        /// What went wrong
        message: String,
    },

    /// I/O failure reading the input file
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Schema("classe".to_string());
        assert!(format!("{err}").contains("classe"));

        let err = Error::InsufficientData {
            class: "B".to_string(),
            part: "part_a".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("insufficient data"));
        assert!(msg.contains('B'));
        assert!(msg.contains("part_a"));

        let err = Error::Fit("fold 3 missing class 'D'".to_string());
        assert!(format!("{err}").contains("fold 3"));

        let err = Error::Convergence("singular covariance for class 'A'".to_string());
        assert!(format!("{err}").contains("singular covariance"));

        let err = Error::Parse {
            line: 17,
            message: "expected 160 fields, found 159".to_string(),
        };
        assert!(format!("{err}").contains("line 17"));
    }
}
