/**
 * Content records: types, drafts, filters and
 *  the normalisation applied before insert.
 */
pub mod content;
/**
 * Operator login and the shared write token.
 */
pub mod gate;
/**
 * Upload rules: size ceiling, storage keys,
 *  public URLs.
 */
pub mod relay;
/**
 * Traits describing the hosted table + bucket
 *  service the portal is backed by.
 */
pub mod store;
/**
 * The operations the portal performs against
 *  the store (list, quote, create, delete).
 */
pub mod sync;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;
pub mod view;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub mod prelude {
    pub use crate::content::{
        ContentDraft, ContentFilter, ContentRecord, ContentType, NewContent, ValidationError,
    };
    pub use crate::gate::{AdminCredentials, AdminGate, AdminSession, AuthError, TokenGate};
    pub use crate::relay::{FileRelay, FileUpload, RelayError, StoredFile, MAX_FILE_SIZE};
    pub use crate::store::{BackingStore, ContentTable, FileBucket, StoreError};
    pub use crate::sync::{ContentSync, SyncError, FALLBACK_QUOTE};
    pub use crate::version::build_info;
    pub use crate::view::{ContentScope, Navigator, View, ViewError};
}
