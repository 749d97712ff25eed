//! Naming and persistence of uploaded blobs in a flat local directory.

pub mod errors;
pub mod key;
pub mod local_store;
pub mod store;

pub use errors::{BlobResult, BlobStoreError};
pub use key::{sanitize_filename, StorageKey};
pub use local_store::LocalFileBlobStore;
pub use store::{BlobStore, ChunkStream, StoredBlob, StoredFile};
