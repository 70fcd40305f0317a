//! Bucketed object storage on the local filesystem (or in memory).

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutMode, PutOptions};

use super::LocalStoreError;

#[derive(Debug, Clone)]
pub(crate) struct Storage {
    inner: Arc<dyn ObjectStore>,
}

impl Storage {
    pub async fn local(path: &Path) -> Result<Self, LocalStoreError> {
        tokio::fs::create_dir_all(path).await?;
        let fs = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| LocalStoreError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
        })
    }

    pub fn memory() -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
        }
    }

    /// `<bucket>/<key>`; each part is a single path segment.
    fn object_path(bucket: &str, key: &str) -> ObjectPath {
        ObjectPath::from_iter([bucket, key])
    }

    /// Write an object, failing if the key is taken.
    pub async fn put(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), LocalStoreError> {
        let path = Self::object_path(bucket, key);
        let opts = PutOptions {
            mode: PutMode::Create,
            ..Default::default()
        };
        match self.inner.put_opts(&path, data.into(), opts).await {
            Ok(_) => Ok(()),
            Err(object_store::Error::AlreadyExists { .. }) => {
                Err(LocalStoreError::AlreadyExists(format!("{}/{}", bucket, key)))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Result<Option<Bytes>, LocalStoreError> {
        let path = Self::object_path(bucket, key);
        match self.inner.get(&path).await {
            Ok(result) => Ok(Some(result.bytes().await?)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove an object. A missing object is not an error.
    pub async fn delete(&self, bucket: &str, key: &str) -> Result<(), LocalStoreError> {
        let path = Self::object_path(bucket, key);
        match self.inner.delete(&path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUCKET: &str = "content-files";

    #[tokio::test]
    async fn test_put_get_delete() {
        let storage = Storage::memory();
        storage
            .put(BUCKET, "1-a.pdf", Bytes::from_static(b"%PDF"))
            .await
            .unwrap();

        assert_eq!(
            storage.get(BUCKET, "1-a.pdf").await.unwrap().unwrap(),
            Bytes::from_static(b"%PDF")
        );

        storage.delete(BUCKET, "1-a.pdf").await.unwrap();
        assert!(storage.get(BUCKET, "1-a.pdf").await.unwrap().is_none());
        // second delete is a no-op
        storage.delete(BUCKET, "1-a.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_put_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::local(dir.path()).await.unwrap();

        storage
            .put(BUCKET, "1-a.pdf", Bytes::from_static(b"one"))
            .await
            .unwrap();
        let err = storage
            .put(BUCKET, "1-a.pdf", Bytes::from_static(b"two"))
            .await
            .unwrap_err();
        assert!(matches!(err, LocalStoreError::AlreadyExists(_)));

        assert_eq!(
            storage.get(BUCKET, "1-a.pdf").await.unwrap().unwrap(),
            Bytes::from_static(b"one")
        );
        assert!(dir.path().join(BUCKET).join("1-a.pdf").exists());
    }
}
