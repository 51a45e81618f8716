//! Error types for the experiment harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error("corrupt input: {0}")]
    CorruptInput(String),

    #[error("label count mismatch: matrix has {matrix} items, label list has {labels}")]
    LabelCountMismatch { matrix: usize, labels: usize },

    #[error("invalid split: {0}")]
    InvalidSplit(String),

    #[error("training failed: {0}")]
    TrainingFailed(String),

    #[error("experiment not trained")]
    NotTrained,

    #[error("experiment not evaluated")]
    NotEvaluated,

    #[error("experiment already trained")]
    AlreadyTrained,

    #[error("experiment already evaluated")]
    AlreadyEvaluated,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, ExperimentError>;
