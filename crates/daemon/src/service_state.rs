use std::sync::Arc;

use tokio::sync::watch;

use common::gate::TokenGate;
use common::store::BackingStore;
use common::sync::ContentSync;

use crate::backend::BackendError;
use crate::service_config::Config;

/// Main service state, shared by every request handler.
#[derive(Clone)]
pub struct State {
    sync: ContentSync,
    gate: TokenGate,
    shutdown: Option<watch::Receiver<()>>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        tracing::debug!(
            backend = ?config.backend,
            "ServiceState::from_config - connecting backing store"
        );
        let store = config.backend.connect(&config.public_url).await?;

        let gate = TokenGate::new(config.admin_token.clone());
        if !gate.is_configured() {
            tracing::warn!("ADMIN_TOKEN is not set; every admin request will be rejected");
        }

        Ok(Self::new(store, gate))
    }

    pub fn new(store: Arc<dyn BackingStore>, gate: TokenGate) -> Self {
        Self {
            sync: ContentSync::new(store),
            gate,
            shutdown: None,
        }
    }

    /// Report shutdown to readiness checks once `rx` fires.
    pub fn with_shutdown(mut self, rx: watch::Receiver<()>) -> Self {
        self.shutdown = Some(rx);
        self
    }

    pub fn shutdown_signal(&self) -> Option<&watch::Receiver<()>> {
        self.shutdown.as_ref()
    }

    pub fn sync(&self) -> &ContentSync {
        &self.sync
    }

    pub fn store(&self) -> &Arc<dyn BackingStore> {
        self.sync.store()
    }

    pub fn gate(&self) -> &TokenGate {
        &self.gate
    }
}

impl AsRef<ContentSync> for State {
    fn as_ref(&self) -> &ContentSync {
        &self.sync
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Backing store setup error: {0}")]
    Backend(#[from] BackendError),
}
