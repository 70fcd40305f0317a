use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::sync::SyncError;

use super::ContentList;
use crate::http_server::api::client::{api_url, ApiRequest};
use crate::http_server::api::envelope::Envelope;
use crate::http_server::api::sync_error_response;
use crate::ServiceState;

/// Every record, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListAllRequest;

pub async fn handler(State(state): State<ServiceState>) -> Result<Response, ListError> {
    let data = state.sync().list_all().await?;
    Ok(Json(Envelope::ok(ContentList { data })).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        match self {
            ListError::Sync(e) => sync_error_response("list content", e),
        }
    }
}

impl ApiRequest for ListAllRequest {
    type Response = ContentList;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.get(api_url(base_url, &["content"]))
    }
}
