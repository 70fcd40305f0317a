use std::fmt::Debug;
use std::ops::Deref;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;
use tokio::sync::watch;

use common::store::BackingStore;

use crate::ServiceState;

#[async_trait]
pub trait DataSource {
    /// Perform various checks on the system to ensure its healthy and ready to accept requests.
    async fn is_ready(&self) -> Result<(), DataSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("one or more dependent services aren't available")]
    DependencyFailure,

    #[error("service has received signal indicating it should shutdown")]
    ShuttingDown,
}

pub type DynDataSource = Arc<dyn DataSource + Send + Sync>;

pub struct StateDataSource(DynDataSource);

impl Debug for StateDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateDataSource").finish()
    }
}

impl StateDataSource {
    #[cfg(test)]
    pub fn new(dds: DynDataSource) -> Self {
        Self(dds)
    }
}

impl Deref for StateDataSource {
    type Target = DynDataSource;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Ready when the backing store answers a trivial query and shutdown has
/// not been requested.
pub struct StoreReadiness {
    store: Arc<dyn BackingStore>,
    shutdown: Option<watch::Receiver<()>>,
}

impl StoreReadiness {
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self {
            store,
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, rx: Option<watch::Receiver<()>>) -> Self {
        self.shutdown = rx;
        self
    }

    fn shutting_down(&self) -> bool {
        // a dropped sender means the service is already going away
        self.shutdown
            .as_ref()
            .is_some_and(|rx| rx.has_changed().unwrap_or(true))
    }
}

#[async_trait]
impl DataSource for StoreReadiness {
    async fn is_ready(&self) -> Result<(), DataSourceError> {
        if self.shutting_down() {
            return Err(DataSourceError::ShuttingDown);
        }
        self.store.ping().await.map_err(|e| {
            tracing::warn!(error = %e, "backing store not ready");
            DataSourceError::DependencyFailure
        })
    }
}

#[async_trait]
impl FromRequestParts<ServiceState> for StateDataSource {
    type Rejection = ();

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let readiness = StoreReadiness::new(state.store().clone())
            .with_shutdown(state.shutdown_signal().cloned());
        Ok(StateDataSource(Arc::new(readiness)))
    }
}
