use thiserror::Error;

/// Errors raised by a user store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Namespace unavailable: {0}")]
    NamespaceUnavailable(String),
    #[error("User already exists: {0}")]
    UserExists(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether the error means the store could not be reached at all.
    #[cfg(test)]
    pub(crate) fn is_connection(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StoreError::Connection(err.to_string()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::UserExists(db_err.message().to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Backend(format!("malformed role list: {}", err))
    }
}
