use std::error::Error;
use std::path::PathBuf;

use url::Url;

use ideal_daemon::http_server::api::client::{ApiClient, ApiError};
use ideal_daemon::state::{AppState, StateError, DEFAULT_API_URL};

/// Resolve the remote URL for the API client.
///
/// Priority: explicit `--remote` flag > config file `api_url` > http://localhost:3000.
pub fn resolve_remote(explicit: Option<Url>, config_path: Option<PathBuf>) -> Url {
    if let Some(url) = explicit {
        return url;
    }
    if let Ok(state) = AppState::load(config_path) {
        if let Ok(url) = Url::parse(&state.config.api_url) {
            return url;
        }
    }
    Url::parse(DEFAULT_API_URL).expect("hardcoded URL must parse")
}

#[derive(Debug, thiserror::Error)]
pub enum AdminAccessError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("no admin_token in config.toml; the server will reject admin requests")]
    NoToken,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Clone)]
pub struct OpContext {
    /// API client (always initialized with default or custom URL)
    pub client: ApiClient,
    /// Optional custom config path (defaults to ~/.ideal)
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    /// Create context with custom remote URL and optional config path
    pub fn new(remote: Url, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        Ok(Self {
            client: ApiClient::new(&remote)?,
            config_path,
        })
    }

    pub fn state(&self) -> Result<AppState, StateError> {
        AppState::load(self.config_path.clone())
    }

    /// A client carrying the admin token. Requires a logged-in session.
    pub fn admin_client(&self) -> Result<ApiClient, AdminAccessError> {
        let state = self.state()?;
        state.require_session()?;
        let token = state
            .config
            .admin_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(AdminAccessError::NoToken)?;
        Ok(self.client.with_admin_token(token)?)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
