use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::Response;

use super::envelope::error_response;
use crate::ServiceState;

/// Header carrying the shared write secret. Header names are matched
/// case-insensitively, so `adminToken` works as sent.
pub const ADMIN_TOKEN_HEADER: &str = "admintoken";

/// Present on a request that carried the configured admin token.
#[derive(Debug, Clone, Copy)]
pub struct AdminToken;

#[async_trait]
impl FromRequestParts<ServiceState> for AdminToken {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());

        match state.gate().authorize(presented) {
            Ok(()) => Ok(AdminToken),
            Err(e) => {
                tracing::warn!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    token_present = presented.is_some(),
                    "rejected admin request"
                );
                Err(error_response(StatusCode::UNAUTHORIZED, e.to_string()))
            }
        }
    }
}
