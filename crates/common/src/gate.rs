//! Admin gate: the operator login and the shared write token.
//!
//! Both checks are single-tenant and single-secret. There is no hashing,
//! expiry or rate limiting.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthorized")]
    Unauthorized,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Marker for a logged-in operator. Its presence is all that is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct AdminGate {
    credentials: AdminCredentials,
}

impl AdminGate {
    pub fn new(credentials: AdminCredentials) -> Self {
        Self { credentials }
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AdminSession, AuthError> {
        if email == self.credentials.email && password == self.credentials.password {
            tracing::info!(email, "admin login accepted");
            Ok(AdminSession {
                email: email.to_string(),
            })
        } else {
            tracing::warn!(email, "admin login rejected");
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Checks the `adminToken` header presented on write requests.
#[derive(Clone, Default)]
pub struct TokenGate {
    secret: Option<String>,
}

impl std::fmt::Debug for TokenGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGate")
            .field("configured", &self.secret.is_some())
            .finish()
    }
}

impl TokenGate {
    /// With no secret configured every request is rejected.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    pub fn authorize(&self, presented: Option<&str>) -> Result<(), AuthError> {
        match (&self.secret, presented) {
            (Some(secret), Some(token)) if token == secret => Ok(()),
            _ => Err(AuthError::Unauthorized),
        }
    }
}
