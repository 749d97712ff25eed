use std::io;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::stream::LocalBoxStream;
use tokio::fs::File;
use crate::errors::BlobResult;
use crate::key::StorageKey;

/// Incoming bytes of one blob. An `Err` item means the source broke off.
pub type ChunkStream<'a> = LocalBoxStream<'a, io::Result<Bytes>>;

/// What is known about a stored blob. There is no index, so everything here is
/// recovered from the key and the file metadata.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub storage_key: StorageKey,
    pub original_name: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

/// A resolved blob, opened for sequential reading.
#[derive(Debug)]
pub struct StoredBlob {
    pub meta: StoredFile,
    pub content: File,
}

/// Blob storage keyed by [`StorageKey`]. Blobs are written once and never change.
#[async_trait(?Send)]
pub trait BlobStore: Send + Sync {
    /// Streams `chunks` into a new blob under `key` and returns the number of
    /// bytes written. Nothing is left behind when this fails or is dropped.
    async fn persist(&self, key: &StorageKey, chunks: ChunkStream<'_>, max_bytes: u64) -> BlobResult<u64>;

    /// Opens the blob stored under the untrusted `key`.
    async fn resolve(&self, key: &str) -> BlobResult<StoredBlob>;

    async fn remove(&self, key: &StorageKey) -> BlobResult<()>;
}
