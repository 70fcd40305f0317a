use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::relay::{FileUpload, RelayError, StoredFile};

use super::auth::AdminToken;
use super::client::{api_url, ApiRequest};
use super::envelope::{error_response, json_rejection, Envelope};
use crate::ServiceState;

/// A file carried inline in a JSON body as base64.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedFile {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_content: String,
}

impl std::fmt::Debug for EncodedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedFile")
            .field("file_name", &self.file_name)
            .field("encoded_len", &self.file_content.len())
            .finish()
    }
}

impl EncodedFile {
    pub fn encode(file_name: impl Into<String>, data: &[u8]) -> Self {
        Self {
            file_name: file_name.into(),
            file_content: STANDARD.encode(data),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.file_name.trim().is_empty() && self.file_content.is_empty()
    }

    pub fn decode(self) -> Result<FileUpload, UploadError> {
        if self.file_name.trim().is_empty() || self.file_content.is_empty() {
            return Err(UploadError::MissingFields);
        }
        let data = STANDARD
            .decode(self.file_content.trim())
            .map_err(|e| UploadError::InvalidContent(e.to_string()))?;
        Ok(FileUpload::new(self.file_name, data))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(flatten)]
    pub file: EncodedFile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
}

pub type UploadResponse = StoredFile;

pub async fn handler(
    _admin: AdminToken,
    State(state): State<ServiceState>,
    body: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Response, UploadError> {
    let Json(req) = body.map_err(UploadError::Body)?;
    let file = req.file.decode()?;
    tracing::info!(file_name = %file.file_name, size = file.data.len(), "upload requested");

    let stored = state
        .sync()
        .relay()
        .upload(file, req.bucket.as_deref())
        .await?;

    Ok(Json(Envelope::ok(stored)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Missing fileName or fileContent")]
    MissingFields,
    #[error("Invalid base64 file content: {0}")]
    InvalidContent(String),
    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error("{0}")]
    Body(JsonRejection),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        match self {
            UploadError::MissingFields | UploadError::InvalidContent(_) => {
                tracing::warn!(error = %self, "upload rejected");
                error_response(StatusCode::BAD_REQUEST, self.to_string())
            }
            UploadError::Relay(e) => {
                let status = match &e {
                    RelayError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    RelayError::MissingFileName => StatusCode::BAD_REQUEST,
                    RelayError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    tracing::error!(error = %e, "upload failed");
                } else {
                    tracing::warn!(error = %e, "upload rejected");
                }
                error_response(status, e.to_string())
            }
            UploadError::Body(rejection) => json_rejection(rejection),
        }
    }
}

impl ApiRequest for UploadRequest {
    type Response = UploadResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(api_url(base_url, &["upload"])).json(&self)
    }
}
