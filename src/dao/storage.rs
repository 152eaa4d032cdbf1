use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by ledger backends regardless of the underlying engine.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not durably commit or read.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Description of the failing operation.
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// Persisted data does not match the schema contract.
    #[error("storage corrupted: {message}")]
    Corrupted {
        /// Description of the offending record.
        message: String,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        StorageError::Unavailable {
            message: message.into(),
            source: Box::new(source),
        }
    }
}
