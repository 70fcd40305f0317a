//! Content sync layer: turns portal actions into backing store calls.
//!
//! Every operation is a single pass over the store with no caching, paging
//! or retries; store failures are handed back with the store's own message.

use std::sync::Arc;

use chrono::Utc;
use rand::seq::IndexedRandom;

use crate::content::{
    ContentDraft, ContentFilter, ContentRecord, ContentType, NewContent, ValidationError,
};
use crate::relay::{FileRelay, FileUpload, RelayError};
use crate::store::{BackingStore, StoreError};

/// Shown when there are no quote records.
pub const FALLBACK_QUOTE: &str = "✨ Welcome to Ideal Classes - Excellence in Education!";

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("content not found: {0}")]
    NotFound(String),
}

#[derive(Clone)]
pub struct ContentSync {
    store: Arc<dyn BackingStore>,
    relay: FileRelay,
}

impl ContentSync {
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        let relay = FileRelay::new(store.clone());
        Self { store, relay }
    }

    pub fn relay(&self) -> &FileRelay {
        &self.relay
    }

    pub fn store(&self) -> &Arc<dyn BackingStore> {
        &self.store
    }

    /// Records for one board/class/type, newest first. Empty is not an error.
    pub async fn list_scope(
        &self,
        board: &str,
        class: &str,
        content_type: ContentType,
    ) -> Result<Vec<ContentRecord>, SyncError> {
        let filter = ContentFilter::scope(board, class).with_type(content_type);
        Ok(self.store.select(&filter).await?)
    }

    /// Everything for a board/class regardless of type.
    pub async fn list_board_class(
        &self,
        board: &str,
        class: &str,
    ) -> Result<Vec<ContentRecord>, SyncError> {
        Ok(self.store.select(&ContentFilter::scope(board, class)).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<ContentRecord>, SyncError> {
        Ok(self.store.select(&ContentFilter::all()).await?)
    }

    pub async fn list_by_type(
        &self,
        content_type: ContentType,
    ) -> Result<Vec<ContentRecord>, SyncError> {
        Ok(self.store.select(&ContentFilter::of_type(content_type)).await?)
    }

    /// Title of a uniformly random quote record, or [`FALLBACK_QUOTE`].
    pub async fn random_quote(&self) -> Result<String, SyncError> {
        let quotes = self.list_by_type(ContentType::Quote).await?;
        Ok(quotes
            .choose(&mut rand::rng())
            .map(|q| q.title.clone())
            .unwrap_or_else(|| FALLBACK_QUOTE.to_string()))
    }

    /// Validate, upload the file if there is one, then insert the row.
    pub async fn create(
        &self,
        draft: ContentDraft,
        file: Option<FileUpload>,
    ) -> Result<ContentRecord, SyncError> {
        draft.validate(file.is_some())?;

        let stored = match file {
            Some(file) => Some(self.relay.upload(file, None).await?),
            None => None,
        };

        let row = NewContent::from_draft(draft, Utc::now(), stored.as_ref());
        match self.store.insert(row).await {
            Ok(record) => {
                tracing::info!(
                    id = %record.id,
                    content_type = %record.content_type,
                    title = %record.title,
                    "content created"
                );
                Ok(record)
            }
            Err(e) => {
                if let Some(stored) = stored {
                    if let Err(cleanup) = self.relay.discard(&stored.storage_path).await {
                        tracing::warn!(
                            storage_path = %stored.storage_path,
                            error = %cleanup,
                            "failed to remove upload after insert failure"
                        );
                    }
                }
                Err(e.into())
            }
        }
    }

    /// Remove the record's storage object (if any), then the row.
    ///
    /// Not transactional: a failure between the two steps leaves the row
    /// pointing at a removed object.
    pub async fn delete(&self, id: &str) -> Result<(), SyncError> {
        let record = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| SyncError::NotFound(id.to_string()))?;

        if let Some(path) = record.storage_path.as_deref().filter(|p| !p.is_empty()) {
            self.relay.discard(path).await?;
            tracing::debug!(id, storage_path = path, "removed storage object");
        }

        self.store.delete(id).await?;
        tracing::info!(id, "content deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    use crate::relay::DEFAULT_BUCKET;
    use crate::testkit::{MemoryStore, StoreEvent};

    fn record(
        id: &str,
        content_type: ContentType,
        board: &str,
        class: &str,
        age_min: i64,
    ) -> ContentRecord {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        ContentRecord {
            id: id.into(),
            content_type,
            title: format!("title {}", id),
            link: format!("https://example.com/{}", id),
            board: board.into(),
            class: class.into(),
            timestamp: base - Duration::minutes(age_min),
            time: None,
            marks: None,
            is_storage_file: false,
            file_name: None,
            storage_path: None,
        }
    }

    fn setup() -> (Arc<MemoryStore>, ContentSync) {
        let store = Arc::new(MemoryStore::new());
        let sync = ContentSync::new(store.clone());
        (store, sync)
    }

    #[tokio::test]
    async fn test_list_scope_filters_and_orders() {
        let (store, sync) = setup();
        store.seed(record("old", ContentType::Quiz, "CBSE", "Class 10", 30));
        store.seed(record("new", ContentType::Quiz, "CBSE", "Class 10", 1));
        store.seed(record("mid", ContentType::Quiz, "CBSE", "Class 10", 10));
        store.seed(record("note", ContentType::Note, "CBSE", "Class 10", 0));
        store.seed(record("class9", ContentType::Quiz, "CBSE", "Class 9", 0));
        store.seed(record("icse", ContentType::Quiz, "ICSE", "Class 10", 0));

        let found = sync
            .list_scope("CBSE", "Class 10", ContentType::Quiz)
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_list_scope_empty_is_ok() {
        let (_store, sync) = setup();
        let found = sync
            .list_scope("CBSE", "Class 6", ContentType::Course)
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_random_quote_fallback() {
        let (store, sync) = setup();
        store.seed(record("n", ContentType::Note, "CBSE", "Class 10", 0));
        assert_eq!(sync.random_quote().await.unwrap(), FALLBACK_QUOTE);
    }

    #[tokio::test]
    async fn test_random_quote_picks_a_quote() {
        let (store, sync) = setup();
        store.seed(record("q1", ContentType::Quote, "", "", 0));
        store.seed(record("q2", ContentType::Quote, "", "", 1));
        let quote = sync.random_quote().await.unwrap();
        assert!(quote == "title q1" || quote == "title q2");
    }

    #[tokio::test]
    async fn test_create_rejects_before_touching_store() {
        let (store, sync) = setup();
        let draft = ContentDraft {
            title: "".into(),
            link: Some("https://x".into()),
            ..ContentDraft::default()
        };
        assert!(matches!(
            sync.create(draft, None).await,
            Err(SyncError::Validation(ValidationError::MissingTitle))
        ));

        let draft = ContentDraft {
            title: "Algebra".into(),
            ..ContentDraft::default()
        };
        assert!(matches!(
            sync.create(draft, None).await,
            Err(SyncError::Validation(ValidationError::MissingLink))
        ));
        assert!(store.events().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_link() {
        let (store, sync) = setup();
        let draft = ContentDraft {
            content_type: ContentType::Quiz,
            title: "Algebra".into(),
            link: Some("https://forms/quiz".into()),
            board: "CBSE".into(),
            class: "Class 10".into(),
            time: Some("30".into()),
            marks: Some("25".into()),
        };
        let created = sync.create(draft, None).await.unwrap();
        assert_eq!(created.link, "https://forms/quiz");
        assert!(!created.is_storage_file);
        assert_eq!(created.marks.as_deref(), Some("25"));
        assert_eq!(store.row_count(), 1);
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn test_create_with_file_overwrites_link() {
        let (store, sync) = setup();
        let draft = ContentDraft {
            content_type: ContentType::Note,
            title: "Chapter 1".into(),
            link: Some("https://ignored".into()),
            board: "CBSE".into(),
            class: "Class 9".into(),
            ..ContentDraft::default()
        };
        let created = sync
            .create(draft, Some(FileUpload::new("ch1.pdf", "%PDF")))
            .await
            .unwrap();

        let path = created.storage_path.clone().unwrap();
        assert!(created.is_storage_file);
        assert_eq!(created.file_name.as_deref(), Some("ch1.pdf"));
        assert_eq!(
            created.link,
            format!("memory://{}/{}", DEFAULT_BUCKET, path)
        );
        assert!(store.has_object(DEFAULT_BUCKET, &path));
    }

    #[tokio::test]
    async fn test_create_removes_upload_when_insert_fails() {
        let (store, sync) = setup();
        store.fail_inserts(true);
        let draft = ContentDraft {
            content_type: ContentType::Note,
            title: "Chapter 1".into(),
            ..ContentDraft::default()
        };
        let err = sync
            .create(draft, Some(FileUpload::new("ch1.pdf", "%PDF")))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Store(StoreError::Backend(_))));
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_storage_before_row() {
        let (store, sync) = setup();
        let mut rec = record("7", ContentType::Note, "CBSE", "Class 10", 0);
        rec.is_storage_file = true;
        rec.storage_path = Some("1700-ch.pdf".into());
        store.seed(rec);
        store.seed_object(DEFAULT_BUCKET, "1700-ch.pdf", "%PDF");

        sync.delete("7").await.unwrap();

        assert_eq!(
            store.events(),
            vec![
                StoreEvent::Find("7".into()),
                StoreEvent::Remove {
                    bucket: DEFAULT_BUCKET.into(),
                    key: "1700-ch.pdf".into(),
                },
                StoreEvent::Delete("7".into()),
            ]
        );
        assert_eq!(store.row_count(), 0);
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_without_storage_path_touches_no_object() {
        let (store, sync) = setup();
        store.seed(record("8", ContentType::Quiz, "CBSE", "Class 10", 0));
        store.seed_object(DEFAULT_BUCKET, "unrelated.pdf", "x");

        sync.delete("8").await.unwrap();

        assert_eq!(
            store.events(),
            vec![StoreEvent::Find("8".into()), StoreEvent::Delete("8".into())]
        );
        assert_eq!(store.object_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_keeps_row_when_storage_removal_fails() {
        let (store, sync) = setup();
        let mut rec = record("9", ContentType::Note, "CBSE", "Class 10", 0);
        rec.storage_path = Some("1700-ch.pdf".into());
        store.seed(rec);
        store.fail_removes(true);

        assert!(matches!(
            sync.delete("9").await,
            Err(SyncError::Store(StoreError::Backend(_)))
        ));
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let (_store, sync) = setup();
        assert!(matches!(
            sync.delete("missing").await,
            Err(SyncError::NotFound(id)) if id == "missing"
        ));
    }
}
