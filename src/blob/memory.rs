use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::{BlobReader, BlobRef, BlobStore};

/// In-memory blob store used by tests and local development. Keeps the
/// lifecycle managers' sequencing rules observable without touching disk.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    fail_deletes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `delete` fail, to exercise the rule that a
    /// blob-delete failure must not block record deletion.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, blob: &BlobRef) -> bool {
        self.blobs.lock().unwrap().contains_key(blob.as_str())
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, file_name: &str, data: &[u8]) -> Result<BlobRef> {
        let key = format!("uploads/{}-{}", Uuid::new_v4(), file_name);
        self.blobs
            .lock()
            .unwrap()
            .insert(key.clone(), data.to_vec());
        Ok(BlobRef::new(key))
    }

    async fn delete(&self, blob: &BlobRef) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::BlobStore("simulated delete failure".to_string()));
        }
        self.blobs.lock().unwrap().remove(blob.as_str());
        Ok(())
    }

    async fn resolve(&self, blob: &BlobRef) -> Result<BlobReader> {
        let data = self
            .blobs
            .lock()
            .unwrap()
            .get(blob.as_str())
            .cloned()
            .ok_or_else(|| AppError::NotFound("File not found on server!".to_string()))?;
        Ok(Box::new(Cursor::new(data)))
    }
}
