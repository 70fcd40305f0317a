use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::http_server::api::envelope::error_response;

pub async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Route not found").into_response()
}

/// A known path hit with the wrong method is just another unmatched route.
pub async fn method_not_allowed(response: Response) -> Response {
    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        return not_found_handler().await;
    }
    response
}
