use std::io;
use actix_multipart::{Field, Multipart};
use actix_web::http::header;
use actix_web::{post, web, HttpRequest, HttpResponse};
use blob_store::{BlobStoreError, ChunkStream, StorageKey};
use futures_util::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use crate::errors::{FileShareErr, SizeLimit};
use crate::services::{AppState, APP_TYPE_JSON, DOWNLOADS_PREFIX};

const FILE_FIELD: &str = "file";

/// Room for boundaries and part headers on top of the file itself when
/// judging a declared `Content-Length`.
const MULTIPART_OVERHEAD_ALLOWANCE: u64 = 1024 * 1024;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub filename: String,
    pub size: u64,
    pub download_url: String,
}

struct StoredUpload {
    key: StorageKey,
    original_name: String,
    size_bytes: u64,
}

#[post("/upload")]
pub async fn upload(
    req: HttpRequest,
    mut payload: Multipart,
    shared_state: web::Data<AppState>,
) -> Result<HttpResponse, FileShareErr> {
    let max_bytes = shared_state.max_upload_bytes;
    if let Some(declared) = declared_size(&req) {
        if declared > max_bytes.saturating_add(MULTIPART_OVERHEAD_ALLOWANCE) {
            tracing::warn!(declared_size = declared, max_bytes, "rejecting upload by declared size");
            return Err(FileShareErr::TooLarge(SizeLimit(max_bytes)));
        }
    }

    let mut stored = None;
    if let Err(e) = receive_file(&mut payload, &shared_state, &mut stored).await {
        // the response never reaches the client, so the key is unknown to anyone
        if let Some(upload) = stored {
            discard(&shared_state, &upload.key).await;
        }
        return Err(e);
    }
    let upload = stored.ok_or(FileShareErr::NoFile)?;

    tracing::info!(
        storage_key = %upload.key,
        size_bytes = upload.size_bytes,
        "upload stored"
    );
    let resp = UploadResult {
        filename: upload.original_name,
        size: upload.size_bytes,
        download_url: format!("{}/{}", DOWNLOADS_PREFIX, upload.key),
    };
    Ok(HttpResponse::Ok().content_type(APP_TYPE_JSON).json(resp))
}

fn declared_size(req: &HttpRequest) -> Option<u64> {
    req.headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
}

/// Walks the multipart fields, storing the single `file` part.
async fn receive_file(
    payload: &mut Multipart,
    state: &AppState,
    stored: &mut Option<StoredUpload>,
) -> Result<(), FileShareErr> {
    while let Some(field) = payload.next().await {
        let field = field?;
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        // plain form fields carry no file, skip over them
        let Some(original_name) = filename else {
            drain(field).await?;
            continue;
        };

        let field_name = field.name().unwrap_or_default();
        if field_name != FILE_FIELD {
            return Err(FileShareErr::UnexpectedField(field_name.to_string()));
        }
        if stored.is_some() {
            return Err(FileShareErr::MultipleFiles);
        }

        *stored = Some(store_field(state, field, original_name).await?);
    }
    Ok(())
}

async fn store_field(state: &AppState, field: Field, original_name: String) -> Result<StoredUpload, FileShareErr> {
    let key = StorageKey::generate(&original_name);
    tracing::debug!(storage_key = %key, original_name = %original_name, "receiving file");

    let chunks: ChunkStream<'_> = field
        .map_err(|e| io::Error::other(e.to_string()))
        .boxed_local();

    match state.store.persist(&key, chunks, state.max_upload_bytes).await {
        Ok(size_bytes) => Ok(StoredUpload { key, original_name, size_bytes }),
        Err(e) => {
            match &e {
                BlobStoreError::SizeLimitExceeded { limit } => {
                    tracing::warn!(storage_key = %key, limit, "upload exceeded size limit")
                }
                BlobStoreError::Interrupted(source) => {
                    tracing::warn!(storage_key = %key, error = %source, "upload interrupted")
                }
                other => tracing::error!(storage_key = %key, error = ?other, "failed to store upload"),
            }
            Err(e.into())
        }
    }
}

async fn drain(mut field: Field) -> Result<(), FileShareErr> {
    while let Some(chunk) = field.next().await {
        chunk?;
    }
    Ok(())
}

async fn discard(state: &AppState, key: &StorageKey) {
    match state.store.remove(key).await {
        Ok(()) => tracing::debug!(storage_key = %key, "discarded rejected upload"),
        Err(e) => tracing::error!(storage_key = %key, error = ?e, "failed to discard rejected upload"),
    }
}
