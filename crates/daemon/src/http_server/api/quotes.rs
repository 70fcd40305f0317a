use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::sync::SyncError;

use super::client::{api_url, ApiRequest};
use super::envelope::Envelope;
use super::sync_error_response;
use crate::ServiceState;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub quote: String,
}

pub async fn handler(State(state): State<ServiceState>) -> Result<Response, QuoteError> {
    let quote = state.sync().random_quote().await?;
    Ok(Json(Envelope::ok(QuoteResponse { quote })).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl IntoResponse for QuoteError {
    fn into_response(self) -> Response {
        match self {
            QuoteError::Sync(e) => sync_error_response("quote", e),
        }
    }
}

impl ApiRequest for QuoteRequest {
    type Response = QuoteResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.get(api_url(base_url, &["quotes"]))
    }
}
