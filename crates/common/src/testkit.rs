//! In-memory backing store for tests.
//!
//! Records every call it receives so tests can assert on ordering
//! (e.g. storage object removed before the row).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};

use crate::content::{sort_newest_first, ContentFilter, ContentRecord, NewContent};
use crate::store::{ContentTable, FileBucket, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Select,
    Find(String),
    Insert(String),
    Delete(String),
    Upload { bucket: String, key: String },
    Remove { bucket: String, key: String },
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<ContentRecord>>,
    objects: RwLock<HashMap<(String, String), Bytes>>,
    events: Mutex<Vec<StoreEvent>>,
    next_id: AtomicU64,
    fail_inserts: AtomicBool,
    fail_removes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, bypassing the event log.
    pub fn seed(&self, record: ContentRecord) {
        self.rows.write().push(record);
    }

    pub fn seed_object(&self, bucket: &str, key: &str, data: impl Into<Bytes>) {
        self.objects
            .write()
            .insert((bucket.to_string(), key.to_string()), data.into());
    }

    pub fn has_object(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .read()
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.lock().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    fn record(&self, event: StoreEvent) {
        self.events.lock().push(event);
    }
}

#[async_trait]
impl ContentTable for MemoryStore {
    async fn select(&self, filter: &ContentFilter) -> Result<Vec<ContentRecord>, StoreError> {
        self.record(StoreEvent::Select);
        let mut rows: Vec<_> = self
            .rows
            .read()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        sort_newest_first(&mut rows);
        Ok(rows)
    }

    async fn find(&self, id: &str) -> Result<Option<ContentRecord>, StoreError> {
        self.record(StoreEvent::Find(id.to_string()));
        Ok(self.rows.read().iter().find(|r| r.id == id).cloned())
    }

    async fn insert(&self, row: NewContent) -> Result<ContentRecord, StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("insert rejected".into()));
        }
        let id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string();
        self.record(StoreEvent::Insert(id.clone()));
        let record = row.into_record(id);
        self.rows.write().push(record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.record(StoreEvent::Delete(id.to_string()));
        self.rows.write().retain(|r| r.id != id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl FileBucket for MemoryStore {
    async fn upload(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), StoreError> {
        let mut objects = self.objects.write();
        let slot = (bucket.to_string(), key.to_string());
        if objects.contains_key(&slot) {
            return Err(StoreError::AlreadyExists(format!("{}/{}", bucket, key)));
        }
        objects.insert(slot, data);
        drop(objects);
        self.record(StoreEvent::Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        Ok(())
    }

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("remove rejected".into()));
        }
        self.record(StoreEvent::Remove {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        self.objects
            .write()
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn fetch(&self, bucket: &str, key: &str) -> Result<Option<Bytes>, StoreError> {
        Ok(self
            .objects
            .read()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("memory://{}/{}", bucket, key)
    }
}
