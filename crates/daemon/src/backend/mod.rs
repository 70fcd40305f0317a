//! Backing store adapters.

pub mod local;
pub mod supabase;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use url::Url;

use common::store::BackingStore;

pub use local::{LocalStore, LocalStoreError};
pub use supabase::{SupabaseError, SupabaseStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BackendKind {
    #[default]
    Supabase,
    Local,
    Memory,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Supabase => "supabase",
            BackendKind::Local => "local",
            BackendKind::Memory => "memory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(BackendKind::Supabase),
            "local" => Ok(BackendKind::Local),
            "memory" => Ok(BackendKind::Memory),
            other => Err(format!(
                "unknown backend '{}' (expected supabase, local or memory)",
                other
            )),
        }
    }
}

#[derive(Clone)]
pub enum BackendConfig {
    Supabase { url: Url, key: String },
    Local { path: PathBuf },
    Memory,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendConfig::Supabase { url, .. } => f
                .debug_struct("Supabase")
                .field("url", &url.as_str())
                .field("key", &"<redacted>")
                .finish(),
            BackendConfig::Local { path } => {
                f.debug_struct("Local").field("path", path).finish()
            }
            BackendConfig::Memory => f.write_str("Memory"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Supabase(#[from] SupabaseError),

    #[error(transparent)]
    Local(#[from] LocalStoreError),
}

impl BackendConfig {
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendConfig::Supabase { .. } => BackendKind::Supabase,
            BackendConfig::Local { .. } => BackendKind::Local,
            BackendConfig::Memory => BackendKind::Memory,
        }
    }

    /// Open the configured store. `public_base` is where this service is
    /// reachable; local stores build file URLs from it.
    pub async fn connect(&self, public_base: &Url) -> Result<Arc<dyn BackingStore>, BackendError> {
        let store: Arc<dyn BackingStore> = match self {
            BackendConfig::Supabase { url, key } => {
                Arc::new(SupabaseStore::new(url.clone(), key)?)
            }
            BackendConfig::Local { path } => {
                Arc::new(LocalStore::open(path, public_base.clone()).await?)
            }
            BackendConfig::Memory => Arc::new(LocalStore::ephemeral(public_base.clone()).await?),
        };
        tracing::info!(backend = %self.kind(), "backing store ready");
        Ok(store)
    }
}
