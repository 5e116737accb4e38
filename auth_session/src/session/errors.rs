use thiserror::Error;

use crate::storage::StorageError;
use crate::userdb::UserError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// More than one user matched a username; a data or query defect, never retried
    #[error("Multiple users returned for query: {0}")]
    AmbiguousUser(String),

    #[error("User must be signed in when calling this method")]
    NotSignedIn,

    #[error("User type does not support cookie authentication")]
    CookieAuthUnsupported,

    #[error("User has not been persisted")]
    NotPersisted,

    #[error("Storage error: {0}")]
    Storage(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),

    /// Error from user database operations
    #[error("User error: {0}")]
    User(UserError),
}

impl From<UserError> for SessionError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NonUnique(query) => SessionError::AmbiguousUser(query),
            other => SessionError::User(other),
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        SessionError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_unique_becomes_ambiguous_user() {
        let err = SessionError::from(UserError::NonUnique("username = bob".to_string()));
        assert!(matches!(err, SessionError::AmbiguousUser(q) if q == "username = bob"));
    }

    #[test]
    fn test_other_user_errors_are_wrapped() {
        let err = SessionError::from(UserError::Storage("disk full".to_string()));
        assert!(matches!(err, SessionError::User(UserError::Storage(_))));
    }

    #[test]
    fn test_storage_error_conversion() {
        let err = SessionError::from(StorageError::Serde("bad json".to_string()));
        assert_eq!(
            err.to_string(),
            "Storage error: Json conversion(Serde) error: bad json"
        );
    }
}
