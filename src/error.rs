use thiserror::Error;

/// Failures that stop a single store operation.
///
/// Rejected submissions are not errors: they come back as
/// [`Outcome::Invalid`](crate::models::Outcome) or
/// [`Outcome::Duplicate`](crate::models::Outcome).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed vote file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
