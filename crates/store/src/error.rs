use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend-independent storage failures. Unique-constraint violations are
/// classified structurally by each backend, never by matching message text.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {message}")]
    DuplicateKey { message: String },
    #[error("storage backend error: {message}")]
    Backend { message: String },
    #[error("storage misconfigured: {0}")]
    Config(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => {
                StoreError::DuplicateKey { message }
            }
            _ => StoreError::Backend {
                message: err.to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Backend {
            message: err.to_string(),
        }
    }
}
