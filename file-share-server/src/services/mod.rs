use std::sync::Arc;
use actix_web::web;
use blob_store::BlobStore;

pub mod download_service;
pub mod index_service;
pub mod upload_service;

#[cfg(test)]
pub(crate) mod test_support;

pub const APP_TYPE_JSON: &str = "application/json";

/// 1 GiB.
pub const MAX_UPLOAD_BYTES: u64 = 1024 * 1024 * 1024;

pub const DOWNLOADS_PREFIX: &str = "/downloads";

/// Shared by every request. The blob store is the only shared resource and
/// holds no mutable in-process state.
pub struct AppState {
    pub(crate) store: Arc<dyn BlobStore>,
    pub(crate) max_upload_bytes: u64,
}

impl AppState {
    pub fn new(store: Arc<dyn BlobStore>, max_upload_bytes: u64) -> Self {
        Self { store, max_upload_bytes }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index_service::index)
        .service(upload_service::upload)
        .service(download_service::download);
}
