use std::io;
use thiserror::Error;

pub type BlobResult<T> = Result<T, BlobStoreError>;


#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("Blob exceeds the size limit of {limit} bytes")]
    SizeLimitExceeded { limit: u64 },

    #[error("Upload stream was interrupted")]
    Interrupted(#[source] io::Error),

    #[error("Storage I/O failed")]
    Io(#[from] io::Error),

    #[error("No blob stored under key `{0}`")]
    NotFound(String),

    #[error("Malformed storage key `{0}`")]
    InvalidKey(String),
}
