use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::{BlobReader, BlobRef, BlobStore};

/// Extensions the portal accepts for uploads: documents plus scanned
/// attachments.
const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "txt", "jpg", "jpeg", "png",
];

/// Local-disk blob store. Files are renamed to a UUID on write; the blob
/// reference is the path relative to the uploads directory's parent, e.g.
/// "uploads/abc123.pdf".
pub struct FsBlobStore {
    uploads_dir: PathBuf,
    max_file_size: usize,
}

impl FsBlobStore {
    pub fn new(uploads_dir: impl Into<PathBuf>, max_file_size_mb: usize) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            max_file_size: max_file_size_mb * 1024 * 1024,
        }
    }

    fn blob_path(&self, blob: &BlobRef) -> Option<PathBuf> {
        // Only keys under "uploads/" are ours; anything else is rejected
        // rather than resolved against the file system.
        let key = blob.as_str().strip_prefix("uploads/")?;
        if key.contains('/') || key.contains("..") {
            return None;
        }
        Some(self.uploads_dir.join(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn store(&self, file_name: &str, data: &[u8]) -> Result<BlobRef> {
        if data.len() > self.max_file_size {
            return Err(AppError::BlobStore(format!(
                "File too large (max {} MB)",
                self.max_file_size / (1024 * 1024)
            )));
        }

        let extension = file_name
            .rsplit('.')
            .next()
            .map(|s| s.to_lowercase())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::BlobStore("Invalid filename".to_string()))?;

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::BlobStore(format!(
                "Invalid file type. Allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        fs::create_dir_all(&self.uploads_dir).await.map_err(|e| {
            AppError::BlobStore(format!("Failed to create uploads directory: {}", e))
        })?;

        let new_filename = format!("{}.{}", Uuid::new_v4(), extension);
        let file_path = self.uploads_dir.join(&new_filename);

        let mut file = fs::File::create(&file_path)
            .await
            .map_err(|e| AppError::BlobStore(format!("Failed to create file: {}", e)))?;
        file.write_all(data)
            .await
            .map_err(|e| AppError::BlobStore(format!("Failed to write file: {}", e)))?;

        Ok(BlobRef::new(format!("uploads/{}", new_filename)))
    }

    async fn delete(&self, blob: &BlobRef) -> Result<()> {
        let Some(path) = self.blob_path(blob) else {
            return Ok(());
        };

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Already gone: fine for the lifecycle operation in progress.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::BlobStore(format!("Failed to delete file: {}", e))),
        }
    }

    async fn resolve(&self, blob: &BlobRef) -> Result<BlobReader> {
        let path = self
            .blob_path(blob)
            .ok_or_else(|| AppError::NotFound("File not found on server!".to_string()))?;

        let file = fs::File::open(&path)
            .await
            .map_err(|_| AppError::NotFound("File not found on server!".to_string()))?;

        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn temp_store() -> FsBlobStore {
        let dir = std::env::temp_dir().join(format!("rollcall-test-{}", Uuid::new_v4()));
        FsBlobStore::new(dir, 5)
    }

    #[tokio::test]
    async fn store_resolve_delete_round_trip() {
        let store = temp_store();
        let blob = store.store("notes.pdf", b"%PDF-1.4 test").await.unwrap();
        assert!(blob.as_str().starts_with("uploads/"));
        assert!(blob.as_str().ends_with(".pdf"));

        let mut reader = store.resolve(&blob).await.unwrap();
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"%PDF-1.4 test");

        store.delete(&blob).await.unwrap();
        assert!(store.resolve(&blob).await.is_err());
        // Deleting again is not an error.
        store.delete(&blob).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_disallowed_extension() {
        let store = temp_store();
        let err = store.store("malware.exe", b"MZ").await.unwrap_err();
        assert!(matches!(err, AppError::BlobStore(_)));
    }

    #[tokio::test]
    async fn rejects_foreign_keys() {
        let store = temp_store();
        let foreign = BlobRef::new("uploads/../../etc/passwd");
        assert!(store.resolve(&foreign).await.is_err());
        // Delete of a key outside the store is a no-op, not a traversal.
        store.delete(&foreign).await.unwrap();
    }
}
