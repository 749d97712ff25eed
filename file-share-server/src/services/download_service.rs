use actix_web::body::SizedStream;
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, web, HttpResponse};
use blob_store::{BlobStoreError, StoredBlob};
use tokio_util::io::ReaderStream;
use crate::errors::FileShareErr;
use crate::services::AppState;

/// Stored bytes never change for a key.
const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

#[get("/downloads/{storage_key}")]
pub async fn download(
    storage_key: web::Path<String>,
    shared_state: web::Data<AppState>,
) -> Result<HttpResponse, FileShareErr> {
    let StoredBlob { meta, content } = match shared_state.store.resolve(&storage_key).await {
        Ok(blob) => blob,
        Err(e @ BlobStoreError::Io(_)) => {
            tracing::error!(storage_key = %storage_key, error = ?e, "failed to open stored file");
            return Err(FileShareErr::Retrieval(e));
        }
        Err(e) => {
            if let BlobStoreError::InvalidKey(_) = e {
                tracing::warn!(storage_key = %storage_key, "rejected malformed storage key");
            }
            return Err(e.into());
        }
    };

    tracing::debug!(storage_key = %meta.storage_key, size_bytes = meta.size_bytes, "serving download");
    let content_type = mime_guess::from_path(&meta.original_name).first_or_octet_stream();
    Ok(HttpResponse::Ok()
        .content_type(content_type.to_string())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(meta.original_name.clone())],
        })
        .insert_header((header::CACHE_CONTROL, IMMUTABLE_CACHE_CONTROL))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .body(SizedStream::new(meta.size_bytes, ReaderStream::new(content))))
}
