// Error types shared by the store, the aggregation engine, and both binaries

use crate::schema::ValidationError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Client input was missing, malformed, or out of range
    #[error("validation failed: {}", describe(.0))]
    Validation(Vec<ValidationError>),

    #[error("database operation failed: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("csv processing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transaction store lock poisoned")]
    LockPoisoned,
}

impl Error {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Error::Validation(vec![ValidationError::new(field, message)])
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl From<Vec<ValidationError>> for Error {
    fn from(errors: Vec<ValidationError>) -> Self {
        Error::Validation(errors)
    }
}

fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
