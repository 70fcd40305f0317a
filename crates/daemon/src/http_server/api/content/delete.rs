use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::sync::SyncError;

use crate::http_server::api::auth::AdminToken;
use crate::http_server::api::client::{api_url, ApiRequest};
use crate::http_server::api::envelope::{path_rejection, Envelope};
use crate::http_server::api::sync_error_response;
use crate::ServiceState;

pub const DELETED_MESSAGE: &str = "Content deleted successfully";

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DeleteRequest {
    /// Id of the record to delete
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

pub async fn handler(
    _admin: AdminToken,
    State(state): State<ServiceState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, DeleteError> {
    let Path(id) = path.map_err(DeleteError::Path)?;
    state.sync().delete(&id).await?;

    Ok(Json(Envelope::ok(DeleteResponse {
        message: DELETED_MESSAGE.to_string(),
    }))
    .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("{0}")]
    Path(PathRejection),
}

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        match self {
            DeleteError::Sync(e) => sync_error_response("delete content", e),
            DeleteError::Path(rejection) => path_rejection(rejection),
        }
    }
}

impl ApiRequest for DeleteRequest {
    type Response = DeleteResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.delete(api_url(base_url, &["content", self.id.as_str()]))
    }
}
