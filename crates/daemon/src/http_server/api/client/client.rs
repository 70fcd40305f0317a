use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};

use super::error::ApiError;
use super::ApiRequest;
use crate::http_server::api::auth::ADMIN_TOKEN_HEADER;
use crate::http_server::api::envelope::{Envelope, ErrorBody};

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
}

impl ApiClient {
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        Self::build(remote, None)
    }

    /// A client that sends `token` as the admin header on every request.
    pub fn with_admin_token(&self, token: &str) -> Result<Self, ApiError> {
        Self::build(&self.remote, Some(token))
    }

    fn build(remote: &Url, admin_token: Option<&str>) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        if let Some(token) = admin_token {
            let mut value = HeaderValue::from_str(token)?;
            value.set_sensitive(true);
            default_headers.insert(HeaderName::from_static(ADMIN_TOKEN_HEADER), value);
        }
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
        })
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client);
        let response = request_builder.send().await?;
        let status = response.status();

        if status.is_success() {
            let envelope = response.json::<Envelope<T::Response>>().await?;
            return Ok(envelope.body);
        }

        let text = response.text().await?;
        match serde_json::from_str::<Envelope<ErrorBody>>(&text) {
            Ok(envelope) => Err(ApiError::Api {
                status,
                message: envelope.body.error,
            }),
            Err(_) => Err(ApiError::HttpStatus(status, text)),
        }
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Get the underlying HTTP client for custom requests
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}
