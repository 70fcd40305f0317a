//! File relay: size check, storage key generation, upload, public URL.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::store::{BackingStore, StoreError};

/// Largest accepted upload (50 MiB). A file of exactly this size is accepted.
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

pub const DEFAULT_BUCKET: &str = "content-files";

#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub data: Bytes,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }
}

/// Where an uploaded file ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub file_name: String,
    pub storage_path: String,
    pub public_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("file is too large ({size} bytes, limit is {limit} bytes)")]
    TooLarge { size: usize, limit: usize },

    #[error("file name is required")]
    MissingFileName,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// `<millis>-<name>`, keeping only the last path segment of `file_name`.
pub fn storage_key(millis: i64, file_name: &str) -> String {
    format!("{}-{}", millis, base_name(file_name))
}

fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name)
        .trim()
}

#[derive(Clone)]
pub struct FileRelay {
    store: Arc<dyn BackingStore>,
    default_bucket: String,
}

impl FileRelay {
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self {
            store,
            default_bucket: DEFAULT_BUCKET.to_string(),
        }
    }

    pub fn default_bucket(&self) -> &str {
        &self.default_bucket
    }

    pub fn check_size(size: usize) -> Result<(), RelayError> {
        if size > MAX_FILE_SIZE {
            return Err(RelayError::TooLarge {
                size,
                limit: MAX_FILE_SIZE,
            });
        }
        Ok(())
    }

    /// Upload `file` to `bucket` (or the default bucket).
    pub async fn upload(
        &self,
        file: FileUpload,
        bucket: Option<&str>,
    ) -> Result<StoredFile, RelayError> {
        Self::check_size(file.data.len())?;

        let name = base_name(&file.file_name);
        if name.is_empty() {
            return Err(RelayError::MissingFileName);
        }

        let bucket = bucket
            .filter(|b| !b.trim().is_empty())
            .unwrap_or(self.default_bucket.as_str());
        let key = storage_key(Utc::now().timestamp_millis(), name);
        let size = file.data.len();

        self.store.upload(bucket, &key, file.data).await?;
        tracing::info!(bucket, key = %key, size, "stored uploaded file");

        Ok(StoredFile {
            file_name: name.to_string(),
            public_url: self.store.public_url(bucket, &key),
            storage_path: key,
        })
    }

    /// Remove a previously stored object from the default bucket.
    pub async fn discard(&self, storage_path: &str) -> Result<(), StoreError> {
        self.store.remove(&self.default_bucket, storage_path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::store::FileBucket;
    use crate::testkit::MemoryStore;

    #[test]
    fn test_size_boundary() {
        assert!(FileRelay::check_size(MAX_FILE_SIZE).is_ok());
        assert!(matches!(
            FileRelay::check_size(MAX_FILE_SIZE + 1),
            Err(RelayError::TooLarge { size, .. }) if size == MAX_FILE_SIZE + 1
        ));
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(
            storage_key(1700000000000, "notes.pdf"),
            "1700000000000-notes.pdf"
        );
        assert_eq!(
            storage_key(1700000000000, "C:\\docs\\notes.pdf"),
            "1700000000000-notes.pdf"
        );
        assert_eq!(storage_key(1, "../../etc/passwd"), "1-passwd");
    }

    #[tokio::test]
    async fn test_upload_exactly_max_size() {
        let store = Arc::new(MemoryStore::new());
        let relay = FileRelay::new(store.clone());

        let stored = relay
            .upload(FileUpload::new("big.bin", vec![0u8; MAX_FILE_SIZE]), None)
            .await
            .unwrap();

        assert!(stored.storage_path.ends_with("-big.bin"));
        assert_eq!(stored.file_name, "big.bin");
        assert_eq!(
            stored.public_url,
            store.public_url(DEFAULT_BUCKET, &stored.storage_path)
        );
        assert!(store.has_object(DEFAULT_BUCKET, &stored.storage_path));
    }

    #[tokio::test]
    async fn test_upload_over_max_size_stores_nothing() {
        let store = Arc::new(MemoryStore::new());
        let relay = FileRelay::new(store.clone());

        let err = relay
            .upload(FileUpload::new("big.bin", vec![0u8; MAX_FILE_SIZE + 1]), None)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::TooLarge { .. }));
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_custom_bucket_and_missing_name() {
        let store = Arc::new(MemoryStore::new());
        let relay = FileRelay::new(store.clone());

        let stored = relay
            .upload(FileUpload::new("a.txt", "hi"), Some("avatars"))
            .await
            .unwrap();
        assert!(store.has_object("avatars", &stored.storage_path));

        let err = relay
            .upload(FileUpload::new("dir/", "hi"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::MissingFileName));
    }
}
