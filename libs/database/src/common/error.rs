/// Error type for connecting to and probing the document store
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Driver-level failure (URI parsing, pool construction, commands)
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// The server could not be reached after the client was built
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
