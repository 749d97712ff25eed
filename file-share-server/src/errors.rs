use std::fmt;
use actix_multipart::MultipartError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use blob_store::BlobStoreError;
use serde::Serialize;
use thiserror::Error;

/// Upload size ceiling as shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimit(pub u64);

impl fmt::Display for SizeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: [(u64, &str); 3] = [(1 << 30, "GiB"), (1 << 20, "MiB"), (1 << 10, "KiB")];
        for (unit, suffix) in UNITS {
            if self.0 >= unit && self.0 % unit == 0 {
                return write!(f, "{} {}", self.0 / unit, suffix);
            }
        }
        write!(f, "{} bytes", self.0)
    }
}


#[derive(Debug, Error)]
pub enum FileShareErr {
    #[error("No file uploaded")]
    NoFile,

    #[error("Unexpected file field `{0}`")]
    UnexpectedField(String),

    #[error("Only one file can be uploaded per request")]
    MultipleFiles,

    #[error("Malformed multipart request: {0}")]
    Multipart(#[from] MultipartError),

    #[error("File too large. Maximum size is {0}")]
    TooLarge(SizeLimit),

    #[error("Upload was interrupted")]
    Interrupted,

    #[error("Upload failed")]
    Storage(#[source] BlobStoreError),

    #[error("Download failed")]
    Retrieval(#[source] BlobStoreError),

    #[error("File not found")]
    NotFound,
}

impl From<BlobStoreError> for FileShareErr {
    fn from(e: BlobStoreError) -> Self {
        match e {
            BlobStoreError::SizeLimitExceeded { limit } => FileShareErr::TooLarge(SizeLimit(limit)),
            BlobStoreError::Interrupted(_) => FileShareErr::Interrupted,
            BlobStoreError::NotFound(_) | BlobStoreError::InvalidKey(_) => FileShareErr::NotFound,
            e @ BlobStoreError::Io(_) => FileShareErr::Storage(e),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for FileShareErr {
    fn status_code(&self) -> StatusCode {
        match self {
            FileShareErr::NoFile
            | FileShareErr::UnexpectedField(_)
            | FileShareErr::MultipleFiles
            | FileShareErr::Multipart(_)
            | FileShareErr::Interrupted => StatusCode::BAD_REQUEST,
            FileShareErr::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            FileShareErr::Storage(_) | FileShareErr::Retrieval(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FileShareErr::NotFound => StatusCode::NOT_FOUND,
        }
    }

    // Storage variants only ever render their generic message; the source stays in the logs.
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody { error: self.to_string() })
    }
}
