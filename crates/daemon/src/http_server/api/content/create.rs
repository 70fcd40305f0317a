use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::content::{ContentDraft, ContentRecord};
use common::sync::SyncError;

use crate::http_server::api::auth::AdminToken;
use crate::http_server::api::client::{api_url, ApiRequest};
use crate::http_server::api::envelope::{json_rejection, Envelope};
use crate::http_server::api::sync_error_response;
use crate::http_server::api::upload::{EncodedFile, UploadError};
use crate::ServiceState;

pub const CREATED_MESSAGE: &str = "Content created successfully";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateRequest {
    #[serde(flatten)]
    pub draft: ContentDraft,
    /// Uploaded alongside the record; replaces `link` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<EncodedFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResponse {
    pub data: ContentRecord,
    pub message: String,
}

pub async fn handler(
    _admin: AdminToken,
    State(state): State<ServiceState>,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<Response, CreateError> {
    let Json(req) = body.map_err(CreateError::Body)?;

    let file = match req.file {
        Some(file) if !file.is_empty() => Some(file.decode()?),
        _ => None,
    };

    tracing::info!(
        content_type = %req.draft.content_type,
        title = %req.draft.title,
        with_file = file.is_some(),
        "create content requested"
    );
    let record = state.sync().create(req.draft, file).await?;

    Ok(Json(Envelope::ok(CreateResponse {
        data: record,
        message: CREATED_MESSAGE.to_string(),
    }))
    .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    File(#[from] UploadError),
    #[error("{0}")]
    Body(JsonRejection),
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        match self {
            CreateError::Sync(e) => sync_error_response("create content", e),
            CreateError::File(e) => e.into_response(),
            CreateError::Body(rejection) => json_rejection(rejection),
        }
    }
}

impl ApiRequest for CreateRequest {
    type Response = CreateResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(api_url(base_url, &["content"])).json(&self)
    }
}
