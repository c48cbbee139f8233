use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("results file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("unexpected results header: {found:?}")]
    SchemaMismatch { found: Vec<String> },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("failed to replace results file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("{0}")]
    Other(String),
}
