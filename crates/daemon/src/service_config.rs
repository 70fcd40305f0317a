use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use url::Url;

use crate::backend::{BackendConfig, BackendKind};

pub const DEFAULT_PORT: u16 = 3000;

/// Values given on the command line; each wins over its environment variable.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub backend: Option<BackendKind>,
    pub data_dir: Option<PathBuf>,
    pub public_url: Option<Url>,
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// address for the HTTP facade to listen on
    pub listen_addr: SocketAddr,
    pub backend: BackendConfig,
    /// shared write secret; `None` rejects every gated request
    pub admin_token: Option<String>,
    /// base url this service is reachable at, used for local file links
    pub public_url: Url,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Build from the process environment plus `overrides`.
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok(), overrides)
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F, overrides: Overrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(*name))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };

        let port = match overrides.port {
            Some(port) => port,
            None => match var(&["PORT"]) {
                Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
                None => DEFAULT_PORT,
            },
        };
        let listen_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));

        let kind = match overrides.backend {
            Some(kind) => kind,
            None => match var(&["IDEAL_BACKEND"]) {
                Some(raw) => raw.parse().map_err(ConfigError::InvalidBackend)?,
                None => BackendKind::default(),
            },
        };

        let backend = match kind {
            BackendKind::Supabase => {
                let url = var(&["SUPABASE_URL", "VITE_SUPABASE_URL"]);
                let key = var(&["SUPABASE_KEY", "VITE_SUPABASE_KEY"]);
                match (url, key) {
                    (Some(url), Some(key)) => BackendConfig::Supabase {
                        url: Url::parse(&url)?,
                        key,
                    },
                    _ => return Err(ConfigError::MissingSupabaseCredentials),
                }
            }
            BackendKind::Local => {
                let path = match overrides.data_dir {
                    Some(path) => path,
                    None => match var(&["IDEAL_DATA_DIR"]) {
                        Some(raw) => PathBuf::from(raw),
                        None => default_data_dir()?,
                    },
                };
                BackendConfig::Local { path }
            }
            BackendKind::Memory => BackendConfig::Memory,
        };

        let public_url = match overrides.public_url {
            Some(url) => url,
            None => match var(&["IDEAL_PUBLIC_URL"]) {
                Some(raw) => Url::parse(&raw)?,
                None => Url::parse(&format!("http://localhost:{}", port))?,
            },
        };

        Ok(Self {
            listen_addr,
            backend,
            admin_token: var(&["ADMIN_TOKEN"]),
            public_url,
            log_level: tracing::Level::INFO,
            log_dir: overrides.log_dir,
        })
    }
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoDataDir)?;
    Ok(home.join(".ideal").join("data"))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing Supabase configuration: set SUPABASE_URL and SUPABASE_KEY (or VITE_SUPABASE_URL / VITE_SUPABASE_KEY)")]
    MissingSupabaseCredentials,
    #[error("Invalid port: {0}")]
    InvalidPort(String),
    #[error("Invalid backend: {0}")]
    InvalidBackend(String),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("no home directory found; set IDEAL_DATA_DIR")]
    NoDataDir,
}
