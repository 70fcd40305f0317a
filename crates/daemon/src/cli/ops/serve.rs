use std::path::PathBuf;

use clap::Args;
use url::Url;

use ideal_daemon::backend::BackendKind;
use ideal_daemon::process::ProcessError;
use ideal_daemon::service_config::{ConfigError, Overrides};
use ideal_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Port to listen on (overrides PORT, default 3000)
    #[arg(long)]
    pub port: Option<u16>,

    /// Backing store (overrides IDEAL_BACKEND)
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Data directory for the local backend (overrides IDEAL_DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Public base URL used for stored file links (overrides IDEAL_PUBLIC_URL)
    #[arg(long)]
    pub public_url: Option<Url>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("service failed: {0}")]
    Process(#[from] ProcessError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = ServiceConfig::from_env(Overrides {
            port: self.port,
            backend: self.backend,
            data_dir: self.data_dir.clone(),
            public_url: self.public_url.clone(),
            log_dir: self.log_dir.clone(),
        })?;

        spawn_service(&config).await?;
        Ok("server stopped".to_string())
    }
}
