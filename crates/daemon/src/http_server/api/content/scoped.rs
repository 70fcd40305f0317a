use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::content::ContentType;
use common::sync::SyncError;

use super::ContentList;
use crate::http_server::api::client::{api_url, ApiRequest};
use crate::http_server::api::envelope::{path_rejection, query_rejection, Envelope};
use crate::http_server::api::sync_error_response;
use crate::ServiceState;

/// Records for one board and class, optionally narrowed to one type.
#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct ScopedRequest {
    /// Board name, e.g. "CBSE"
    pub board: String,
    /// Class name, e.g. "Class 10"
    pub class: String,
    /// Only records of this type
    #[arg(long = "type", value_name = "TYPE")]
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopedQuery {
    #[serde(rename = "type", default)]
    pub content_type: Option<ContentType>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    path: Result<Path<(String, String)>, PathRejection>,
    query: Result<Query<ScopedQuery>, QueryRejection>,
) -> Result<Response, ScopedError> {
    let Path((board, class)) = path.map_err(ScopedError::Path)?;
    let Query(query) = query.map_err(ScopedError::Query)?;

    let data = match query.content_type {
        Some(content_type) => {
            state
                .sync()
                .list_scope(&board, &class, content_type)
                .await?
        }
        None => state.sync().list_board_class(&board, &class).await?,
    };

    tracing::debug!(board = %board, class = %class, count = data.len(), "listed scope");
    Ok(Json(Envelope::ok(ContentList { data })).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ScopedError {
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("{0}")]
    Path(PathRejection),
    #[error("{0}")]
    Query(QueryRejection),
}

impl IntoResponse for ScopedError {
    fn into_response(self) -> Response {
        match self {
            ScopedError::Sync(e) => sync_error_response("list scope", e),
            ScopedError::Path(rejection) => path_rejection(rejection),
            ScopedError::Query(rejection) => query_rejection(rejection),
        }
    }
}

impl ApiRequest for ScopedRequest {
    type Response = ContentList;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let url = api_url(
            base_url,
            &["content", self.board.as_str(), self.class.as_str()],
        );
        let request = client.get(url);
        match self.content_type {
            Some(content_type) => request.query(&[("type", content_type.as_str())]),
            None => request,
        }
    }
}
