//! The `{ success, ... }` body every API response is wrapped in.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn ok(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Envelope {
        success: false,
        body: ErrorBody {
            error: message.into(),
        },
    };
    (status, Json(body)).into_response()
}

/// Malformed requests keep the extractor's status but use the envelope.
pub fn json_rejection(rejection: JsonRejection) -> Response {
    tracing::debug!(error = %rejection, "rejected request body");
    error_response(rejection.status(), rejection.body_text())
}

pub fn query_rejection(rejection: QueryRejection) -> Response {
    error_response(rejection.status(), rejection.body_text())
}

pub fn path_rejection(rejection: PathRejection) -> Response {
    error_response(rejection.status(), rejection.body_text())
}
