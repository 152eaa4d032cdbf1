use thiserror::Error;

use crate::{dao::storage::StorageError, link::LinkError};

/// Failures that cross the event-processing boundary.
///
/// Everything else (duplicate buzzes, malformed lines) is resolved to a
/// continuation decision inside the controller and never reaches here.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The ledger cannot durably commit or read; fatal, no retry.
    #[error("storage failure")]
    Storage(#[from] StorageError),
    /// The link cannot be read or written; fatal, no retry.
    #[error("link failure")]
    Link(#[from] LinkError),
}
