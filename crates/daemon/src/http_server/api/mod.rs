use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::Router;
use http::header::{HeaderName, ACCEPT, CONTENT_TYPE, ORIGIN};
use http::Method;
use tower_http::cors::{Any, CorsLayer};

use common::relay::RelayError;
use common::sync::SyncError;

pub mod auth;
pub mod client;
pub mod content;
pub mod envelope;
pub mod health;
pub mod quotes;
pub mod upload;

pub use content::{CreateRequest, DeleteRequest, ListAllRequest, ScopedRequest};
pub use health::HealthRequest;
pub use quotes::QuoteRequest;
pub use upload::UploadRequest;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST, Method::DELETE])
        .allow_headers(vec![
            ACCEPT,
            CONTENT_TYPE,
            ORIGIN,
            HeaderName::from_static(auth::ADMIN_TOKEN_HEADER),
        ])
        .allow_origin(Any)
        .allow_credentials(false);

    Router::new()
        .route("/health", get(health::handler))
        .route("/content", get(content::list::handler).post(content::create::handler))
        .route("/content/:id", delete(content::delete::handler))
        .route("/content/:board/:class", get(content::scoped::handler))
        .route("/upload", post(upload::handler))
        .route("/quotes", get(quotes::handler))
        .with_state(state)
        .layer(cors_layer)
}

/// Status code for a failed sync operation.
pub(crate) fn sync_status(err: &SyncError) -> StatusCode {
    match err {
        SyncError::Validation(_) => StatusCode::BAD_REQUEST,
        SyncError::Relay(RelayError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
        SyncError::Relay(RelayError::MissingFileName) => StatusCode::BAD_REQUEST,
        SyncError::Relay(RelayError::Store(_)) | SyncError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        SyncError::NotFound(_) => StatusCode::NOT_FOUND,
    }
}

/// Log and render a sync failure. Store failures carry the store's message.
pub(crate) fn sync_error_response(op: &'static str, err: SyncError) -> Response {
    let status = sync_status(&err);
    if status.is_server_error() {
        tracing::error!(op, error = %err, "request failed");
    } else {
        tracing::warn!(op, error = %err, "request rejected");
    }
    envelope::error_response(status, err.to_string())
}
