use thiserror::Error;

use crate::utils::UtilError;

#[derive(Clone, Error, Debug)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    /// A lookup expected at most one record and found several
    #[error("Multiple users returned for query: {0}")]
    NonUnique(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        UserError::Storage(err.to_string())
    }
}
