//! The backing store seam: a `content` table plus object buckets.
//!
//! Adapters live with the service (hosted REST store, local SQLite + object
//! storage); everything in this crate talks to them through these traits.

use async_trait::async_trait;
use bytes::Bytes;

use crate::content::{ContentFilter, ContentRecord, NewContent};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store rejected or failed the request; carries its message verbatim.
    #[error("{0}")]
    Backend(String),

    #[error("object already exists: {0}")]
    AlreadyExists(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ContentTable: Send + Sync {
    /// Rows matching `filter`, newest first.
    async fn select(&self, filter: &ContentFilter) -> Result<Vec<ContentRecord>, StoreError>;

    async fn find(&self, id: &str) -> Result<Option<ContentRecord>, StoreError>;

    /// Insert a row and return it with its store-assigned id.
    async fn insert(&self, row: NewContent) -> Result<ContentRecord, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait FileBucket: Send + Sync {
    /// Store `data` under `key`. Never overwrites; an existing key is
    /// `StoreError::AlreadyExists`.
    async fn upload(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), StoreError>;

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StoreError>;

    async fn fetch(&self, bucket: &str, key: &str) -> Result<Option<Bytes>, StoreError>;

    fn public_url(&self, bucket: &str, key: &str) -> String;
}

pub trait BackingStore: ContentTable + FileBucket {}

impl<T: ContentTable + FileBucket> BackingStore for T {}
