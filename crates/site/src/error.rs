use beyond_core::error::CoreError;
use beyond_events::EventError;
use beyond_store::StoreError;
use serde::Serialize;

/// An object stored by an admin upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    pub bucket: String,
    pub key: String,
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Event(#[from] EventError),

    /// A batch upload stopped at `failed_file`. Files in `uploaded` stay
    /// in the bucket.
    #[error("Upload of '{failed_file}' failed after {} file(s): {reason}", uploaded.len())]
    UploadFailed {
        uploaded: Vec<UploadedImage>,
        failed_file: String,
        reason: String,
    },

    /// A blocking task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for SiteError {
    fn from(e: tokio::task::JoinError) -> Self {
        SiteError::Task(e.to_string())
    }
}
