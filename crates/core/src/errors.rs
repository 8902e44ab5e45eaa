//! Error types shared across the evapro crates.

use thiserror::Error;

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the local tracking database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A by-name column reference outside the allow-list.
    #[error("unsupported column '{0}'")]
    UnsupportedColumn(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors raised while talking to the remote LIMS databases.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("LIMS connection failed: {0}")]
    ConnectionFailed(String),

    #[error("LIMS query failed: {0}")]
    QueryFailed(String),
}

/// Top-level error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Local store failure.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Remote LIMS failure.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// External monitoring tool failure.
    #[error("monitor tool error: {0}")]
    Monitor(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True when the underlying cause is a unique-key violation.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Database(DatabaseError::UniqueViolation(_)))
    }
}
