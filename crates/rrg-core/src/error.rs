use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RrgError {
    #[error("Insufficient data for {context}: need at least {required}, got {available}")]
    InsufficientData {
        required: usize,
        available: usize,
        context: String,
    },

    #[error("Degenerate smoothing baseline in {context}")]
    DegenerateSmoothing { context: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Source data error for {symbol}: {message}")]
    SourceData { symbol: String, message: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Benchmark unavailable: {0}")]
    MissingBenchmark(String),
}

impl RrgError {
    pub fn insufficient_data(required: usize, available: usize, context: impl Into<String>) -> Self {
        Self::InsufficientData {
            required,
            available,
            context: context.into(),
        }
    }

    pub fn degenerate(context: impl Into<String>) -> Self {
        Self::DegenerateSmoothing {
            context: context.into(),
        }
    }

    pub fn source(symbol: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceData {
            symbol: symbol.into(),
            message: message.into(),
        }
    }

    /// Category recorded next to the reason string in a batch failure list.
    pub fn kind(&self) -> FailureKind {
        match self {
            RrgError::InsufficientData { .. } => FailureKind::InsufficientData,
            RrgError::DegenerateSmoothing { .. } => FailureKind::DegenerateSmoothing,
            RrgError::InvalidParameter(_) | RrgError::InvalidConfig(_) => {
                FailureKind::InvalidParameter
            }
            RrgError::SourceData { .. } | RrgError::MissingBenchmark(_) => FailureKind::SourceData,
            RrgError::InvalidData(_) => FailureKind::Computation,
        }
    }
}

/// Why a sector was left out of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InsufficientData,
    DegenerateSmoothing,
    InvalidParameter,
    SourceData,
    Computation,
}

pub type Result<T> = std::result::Result<T, RrgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            RrgError::insufficient_data(30, 5, "overlap").kind(),
            FailureKind::InsufficientData
        );
        assert_eq!(
            RrgError::InvalidParameter("period".into()).kind(),
            FailureKind::InvalidParameter
        );
        assert_eq!(RrgError::source("BANK", "missing").kind(), FailureKind::SourceData);
    }

    #[test]
    fn test_error_message() {
        let err = RrgError::insufficient_data(30, 5, "BANK overlap");
        assert_eq!(
            err.to_string(),
            "Insufficient data for BANK overlap: need at least 30, got 5"
        );
    }
}
