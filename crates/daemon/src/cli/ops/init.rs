use clap::Args;
use url::Url;

use ideal_daemon::state::{AppConfig, AppState, StateError, DEFAULT_API_URL};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Operator email accepted by `ideal login`
    #[arg(long)]
    pub admin_email: String,

    /// Operator password accepted by `ideal login`
    #[arg(long)]
    pub admin_password: String,

    /// Shared write secret; must match the server's ADMIN_TOKEN
    #[arg(long)]
    pub admin_token: Option<String>,

    /// Portal the CLI talks to
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: Url,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("admin email and password must not be empty")]
    EmptyCredentials,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        if self.admin_email.trim().is_empty() || self.admin_password.is_empty() {
            return Err(InitError::EmptyCredentials);
        }

        let config = AppConfig {
            api_url: self.api_url.to_string(),
            admin_email: self.admin_email.trim().to_string(),
            admin_password: self.admin_password.clone(),
            admin_token: self.admin_token.clone().filter(|t| !t.is_empty()),
        };
        let state = AppState::init(ctx.config_path.clone(), config)?;

        Ok(format!(
            "Initialized ideal directory at {}",
            state.ideal_dir.display()
        ))
    }
}
