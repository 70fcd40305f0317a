use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

use common::gate::{AdminCredentials, AdminGate, AdminSession};

pub const APP_NAME: &str = "ideal";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const SESSION_FILE_NAME: &str = "session.json";
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Portal the CLI talks to
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Operator login checked by `ideal login`
    pub admin_email: String,
    pub admin_password: String,
    /// Sent as the `adminToken` header on write requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_url", &self.api_url)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &"<redacted>")
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AppConfig {
    pub fn credentials(&self) -> AdminCredentials {
        AdminCredentials {
            email: self.admin_email.clone(),
            password: self.admin_password.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the ideal directory (~/.ideal)
    pub ideal_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Path to the admin session marker
    pub session_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the ideal directory path (custom or default ~/.ideal)
    pub fn ideal_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new state directory
    pub fn init(custom_path: Option<PathBuf>, config: AppConfig) -> Result<Self, StateError> {
        let ideal_dir = Self::ideal_dir(custom_path)?;
        let config_path = ideal_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&ideal_dir)?;
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        Ok(Self {
            session_path: ideal_dir.join(SESSION_FILE_NAME),
            ideal_dir,
            config_path,
            config,
        })
    }

    /// Load existing state
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let ideal_dir = Self::ideal_dir(custom_path)?;
        let config_path = ideal_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(StateError::NotInitialized);
        }

        let config: AppConfig = toml::from_str(&fs::read_to_string(&config_path)?)?;

        Ok(Self {
            session_path: ideal_dir.join(SESSION_FILE_NAME),
            ideal_dir,
            config_path,
            config,
        })
    }

    pub fn admin_gate(&self) -> AdminGate {
        AdminGate::new(self.config.credentials())
    }

    /// The persisted admin session, if any.
    pub fn session(&self) -> Result<Option<AdminSession>, StateError> {
        if !self.session_path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.session_path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn save_session(&self, session: &AdminSession) -> Result<(), StateError> {
        fs::write(&self.session_path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    /// Remove the session marker. Returns whether one existed.
    pub fn clear_session(&self) -> Result<bool, StateError> {
        match fs::remove_file(&self.session_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// The session, or `NotLoggedIn`.
    pub fn require_session(&self) -> Result<AdminSession, StateError> {
        self.session()?.ok_or(StateError::NotLoggedIn)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("ideal directory not initialized. Run 'ideal init' first")]
    NotInitialized,

    #[error("ideal directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("not logged in. Run 'ideal login' first")]
    NotLoggedIn,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("session file error: {0}")]
    Session(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            api_url: DEFAULT_API_URL.into(),
            admin_email: "admin@example.com".into(),
            admin_password: "hunter2".into(),
            admin_token: Some("s3cret".into()),
        }
    }

    #[test]
    fn test_init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");

        AppState::init(Some(path.clone()), config()).unwrap();
        assert!(matches!(
            AppState::init(Some(path.clone()), config()),
            Err(StateError::AlreadyInitialized)
        ));

        let state = AppState::load(Some(path)).unwrap();
        assert_eq!(state.config.admin_email, "admin@example.com");
        assert_eq!(state.config.admin_token.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_load_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppState::load(Some(dir.path().to_path_buf())),
            Err(StateError::NotInitialized)
        ));
    }

    #[test]
    fn test_session_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::init(Some(dir.path().to_path_buf()), config()).unwrap();

        assert!(state.session().unwrap().is_none());
        assert!(matches!(
            state.require_session(),
            Err(StateError::NotLoggedIn)
        ));

        let session = state
            .admin_gate()
            .login("admin@example.com", "hunter2")
            .unwrap();
        state.save_session(&session).unwrap();
        assert_eq!(state.require_session().unwrap(), session);

        assert!(state.clear_session().unwrap());
        assert!(!state.clear_session().unwrap());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let printed = format!("{:?}", config());
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("s3cret"));
    }
}
