use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::client::{api_url, ApiRequest};
use super::envelope::Envelope;

pub const STATUS_MESSAGE: &str = "Server is running";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn handler() -> Response {
    Json(Envelope::ok(HealthResponse {
        status: STATUS_MESSAGE.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
    .into_response()
}

impl ApiRequest for HealthRequest {
    type Response = HealthResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.get(api_url(base_url, &["health"]))
    }
}
