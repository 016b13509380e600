use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::error::Result;

pub mod fs;
pub mod memory;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;

/// Opaque handle to file content stored outside the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct BlobRef(String);

impl BlobRef {
    pub fn new(key: impl Into<String>) -> Self {
        BlobRef(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An inbound file as received from the caller.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

pub type BlobReader = Box<dyn AsyncRead + Send + Unpin>;

/// A resolved file ready to be sent to the caller.
pub struct Download {
    pub file_name: String,
    pub content_type: String,
    pub reader: BlobReader,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Narrow seam over file storage so lifecycle managers can be tested
/// without a real file system.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the bytes and hand back a reference to them.
    async fn store(&self, file_name: &str, data: &[u8]) -> Result<BlobRef>;

    /// Remove a blob. An already-missing blob is not an error for the
    /// record-lifecycle operation in progress, so implementations return
    /// `Ok` when there is nothing to delete.
    async fn delete(&self, blob: &BlobRef) -> Result<()>;

    /// Open the blob's content for download.
    async fn resolve(&self, blob: &BlobRef) -> Result<BlobReader>;
}

/// Adapt a resolved blob into a byte stream for a download response.
pub fn byte_stream(reader: BlobReader) -> ReaderStream<BlobReader> {
    ReaderStream::new(reader)
}
