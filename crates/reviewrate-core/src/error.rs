use std::path::PathBuf;

use thiserror::Error;

/// A set of scores that cannot be submitted.
#[derive(Debug, Error)]
pub enum RatingError {
    #[error("score {0} has not been rated (must be non-zero)")]
    Unrated(&'static str),

    #[error("score {score} = {value} is outside 0.0..=5.0")]
    OutOfRange { score: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("data file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: arrow::error::ArrowError,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("no review pending for {0}")]
    NothingPending(String),

    #[error(transparent)]
    Rating(#[from] RatingError),

    #[error("failed to record rating: {0}")]
    Log(#[source] Box<dyn std::error::Error + Send + Sync>),
}
