//! Self-hosted backing store: SQLite for the content table, object storage
//! for buckets. Stored files are served back by the service under
//! `/files/<bucket>/<key>`.

mod database;
mod storage;

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use common::content::{ContentFilter, ContentRecord, NewContent};
use common::store::{ContentTable, FileBucket, StoreError};

use database::Database;
use storage::Storage;

const DATABASE_FILE: &str = "content.sqlite";
const OBJECTS_DIR: &str = "objects";

#[derive(Debug, thiserror::Error)]
pub enum LocalStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("object storage error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("object already exists: {0}")]
    AlreadyExists(String),

    #[error("corrupt row {0}")]
    CorruptRow(String),
}

impl From<LocalStoreError> for StoreError {
    fn from(e: LocalStoreError) -> Self {
        match e {
            LocalStoreError::AlreadyExists(key) => StoreError::AlreadyExists(key),
            LocalStoreError::Database(sqlx::Error::PoolTimedOut)
            | LocalStoreError::Database(sqlx::Error::PoolClosed) => {
                StoreError::Unavailable(e.to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    db: Database,
    storage: Storage,
    public_base: Url,
}

impl LocalStore {
    /// Open (or create) a store rooted at `dir`.
    pub async fn open(dir: &Path, public_base: Url) -> Result<Self, LocalStoreError> {
        let db = Database::open(&dir.join(DATABASE_FILE)).await?;
        let storage = Storage::local(&dir.join(OBJECTS_DIR)).await?;
        tracing::info!(path = %dir.display(), "opened local content store");
        Ok(Self {
            db,
            storage,
            public_base,
        })
    }

    /// In-memory store; everything is lost on drop.
    pub async fn ephemeral(public_base: Url) -> Result<Self, LocalStoreError> {
        Ok(Self {
            db: Database::in_memory().await?,
            storage: Storage::memory(),
            public_base,
        })
    }
}

#[async_trait]
impl ContentTable for LocalStore {
    async fn select(&self, filter: &ContentFilter) -> Result<Vec<ContentRecord>, StoreError> {
        Ok(self.db.select(filter).await?)
    }

    async fn find(&self, id: &str) -> Result<Option<ContentRecord>, StoreError> {
        Ok(self.db.find(id).await?)
    }

    async fn insert(&self, row: NewContent) -> Result<ContentRecord, StoreError> {
        Ok(self.db.insert(row).await?)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        // Matches the hosted store: deleting a missing row is not an error.
        let removed = self.db.delete(id).await?;
        if removed == 0 {
            tracing::debug!(id, "delete matched no rows");
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(self.db.ping().await?)
    }
}

#[async_trait]
impl FileBucket for LocalStore {
    async fn upload(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), StoreError> {
        Ok(self.storage.put(bucket, key, data).await?)
    }

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        Ok(self.storage.delete(bucket, key).await?)
    }

    async fn fetch(&self, bucket: &str, key: &str) -> Result<Option<Bytes>, StoreError> {
        Ok(self.storage.get(bucket, key).await?)
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        let mut url = self.public_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["files", bucket, key]);
        }
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use common::content::ContentType;

    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:3000/").unwrap()
    }

    #[test]
    fn test_store_error_mapping() {
        let e: StoreError = LocalStoreError::AlreadyExists("b/k".into()).into();
        assert!(matches!(e, StoreError::AlreadyExists(k) if k == "b/k"));

        let e: StoreError = LocalStoreError::Database(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(e, StoreError::Unavailable(_)));

        let e: StoreError = LocalStoreError::CorruptRow("x".into()).into();
        assert!(matches!(e, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn test_public_url() {
        let store = LocalStore::ephemeral(base()).await.unwrap();
        assert_eq!(
            store.public_url("content-files", "1700-notes.pdf"),
            "http://localhost:3000/files/content-files/1700-notes.pdf"
        );

        let nested = LocalStore::ephemeral(Url::parse("https://portal.example/api/").unwrap())
            .await
            .unwrap();
        assert_eq!(
            nested.public_url("content-files", "1 a.pdf"),
            "https://portal.example/api/files/content-files/1%20a.pdf"
        );
    }

    #[tokio::test]
    async fn test_open_persists_between_handles() {
        let dir = tempfile::tempdir().unwrap();
        let row = NewContent {
            content_type: ContentType::Course,
            title: "Rust basics".into(),
            link: "https://example.com/rust".into(),
            board: "Courses".into(),
            class: "Web Development".into(),
            timestamp: chrono::Utc::now(),
            time: None,
            marks: None,
            is_storage_file: false,
            file_name: None,
            storage_path: None,
        };

        let id = {
            let store = LocalStore::open(dir.path(), base()).await.unwrap();
            store
                .upload("content-files", "1-a.txt", Bytes::from_static(b"hi"))
                .await
                .unwrap();
            store.insert(row).await.unwrap().id
        };

        let store = LocalStore::open(dir.path(), base()).await.unwrap();
        let found = store.find(&id).await.unwrap().unwrap();
        assert_eq!(found.title, "Rust basics");
        assert_eq!(
            store.fetch("content-files", "1-a.txt").await.unwrap(),
            Some(Bytes::from_static(b"hi"))
        );

        store.delete(&id).await.unwrap();
        store.delete(&id).await.unwrap();
        assert!(store.find(&id).await.unwrap().is_none());
    }
}
