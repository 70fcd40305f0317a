//! Serves objects from the local backends at the URLs they hand out.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use common::store::StoreError;

use crate::http_server::api::envelope::error_response;
use crate::ServiceState;

pub async fn handler(
    State(state): State<ServiceState>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<Response, FileError> {
    let key = key.trim_start_matches('/');
    let data = state
        .store()
        .fetch(&bucket, key)
        .await?
        .ok_or(FileError::NotFound)?;

    let mime = mime_guess::from_path(key).first_or_octet_stream();
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CACHE_CONTROL, "max-age=3600".to_string()),
        ],
        data,
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("File not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for FileError {
    fn into_response(self) -> Response {
        match self {
            FileError::NotFound => error_response(StatusCode::NOT_FOUND, "File not found"),
            FileError::Store(e) => {
                tracing::error!(error = %e, "failed to fetch stored file");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}
