use std::io;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use crate::errors::{BlobResult, BlobStoreError};
use crate::key::StorageKey;
use crate::store::{BlobStore, ChunkStream, StoredBlob, StoredFile};

/// Flat directory of blobs, one file per key.
#[derive(Debug, Clone)]
pub struct LocalFileBlobStore {
    base_path: PathBuf,
}

impl LocalFileBlobStore {
    /// Opens the store rooted at `base_path`, creating the directory if needed.
    pub fn open(base_path: impl Into<PathBuf>) -> BlobResult<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path_for(&self, key: &StorageKey) -> PathBuf {
        self.base_path.join(key.as_str())
    }
}

/// Deletes the partial file on drop unless committed. This also covers the
/// persist future being dropped mid-write when a client goes away.
struct PartialBlob {
    path: PathBuf,
    committed: bool,
}

impl PartialBlob {
    fn new(path: PathBuf) -> Self {
        Self { path, committed: false }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PartialBlob {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed partial blob"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "failed to remove partial blob"),
        }
    }
}

async fn write_chunks(mut file: File, mut chunks: ChunkStream<'_>, max_bytes: u64) -> BlobResult<u64> {
    let mut written: u64 = 0;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(BlobStoreError::Interrupted)?;
        written += chunk.len() as u64;
        // checked before the write so an oversized blob never hits the disk in full
        if written > max_bytes {
            return Err(BlobStoreError::SizeLimitExceeded { limit: max_bytes });
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

#[async_trait(?Send)]
impl BlobStore for LocalFileBlobStore {
    async fn persist(&self, key: &StorageKey, chunks: ChunkStream<'_>, max_bytes: u64) -> BlobResult<u64> {
        let partial_path = self.base_path.join(key.partial_name());
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&partial_path)
            .await?;
        let partial = PartialBlob::new(partial_path);

        let written = write_chunks(file, chunks, max_bytes).await?;

        let final_path = self.path_for(key);
        if fs::try_exists(&final_path).await? {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, "blob already stored").into());
        }
        fs::rename(&partial.path, &final_path).await?;
        partial.commit();

        tracing::debug!(storage_key = %key, size_bytes = written, "blob persisted");
        Ok(written)
    }

    async fn resolve(&self, key: &str) -> BlobResult<StoredBlob> {
        let key = StorageKey::parse(key)?;
        let content = match File::open(self.path_for(&key)).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(BlobStoreError::NotFound(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let metadata = content.metadata().await?;
        if !metadata.is_file() {
            return Err(BlobStoreError::NotFound(key.to_string()));
        }

        Ok(StoredBlob {
            meta: StoredFile {
                original_name: key.name().to_string(),
                size_bytes: metadata.len(),
                created_at: key.created_at(),
                storage_key: key,
            },
            content,
        })
    }

    async fn remove(&self, key: &StorageKey) -> BlobResult<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(BlobStoreError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
