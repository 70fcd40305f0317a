//! Hosted backing store: a PostgREST `content` table plus a storage API,
//! both reached over HTTPS with a project key.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use common::content::{ContentFilter, ContentRecord, NewContent};
use common::store::{ContentTable, FileBucket, StoreError};

const TABLE: &str = "content";

#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("invalid project key: {0}")]
    InvalidKey(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("project url cannot be used as a base: {0}")]
    BadUrl(Url),
}

/// Error body shapes returned by PostgREST and the storage API.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    #[serde(rename = "statusCode")]
    status_code: Option<serde_json::Value>,
}

impl ErrorBody {
    fn reports_conflict(&self) -> bool {
        match &self.status_code {
            Some(serde_json::Value::String(s)) => s == "409",
            Some(serde_json::Value::Number(n)) => n.as_u64() == Some(409),
            _ => false,
        }
    }
}

#[derive(Clone)]
pub struct SupabaseStore {
    base: Url,
    client: Client,
}

impl std::fmt::Debug for SupabaseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseStore")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl SupabaseStore {
    pub fn new(base: Url, key: &str) -> Result<Self, SupabaseError> {
        if base.cannot_be_a_base() {
            return Err(SupabaseError::BadUrl(base));
        }

        let mut default_headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(key)?;
        api_key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", key))?;
        bearer.set_sensitive(true);
        default_headers.insert(HeaderName::from_static("apikey"), api_key);
        default_headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder().default_headers(default_headers).build()?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn table_url(&self) -> Url {
        self.endpoint(&["rest", "v1", TABLE])
    }

    fn object_url(&self, bucket: &str, key: &str) -> Url {
        self.endpoint(&["storage", "v1", "object", bucket, key])
    }

    /// PostgREST query parameters for `filter`, newest first.
    fn select_params(filter: &ContentFilter) -> Vec<(&'static str, String)> {
        let mut params = vec![("select", "*".to_string())];
        if let Some(content_type) = filter.content_type {
            params.push(("type", format!("eq.{}", content_type)));
        }
        if let Some(board) = &filter.board {
            params.push(("board", format!("eq.{}", board)));
        }
        if let Some(class) = &filter.class {
            params.push(("class", format!("eq.{}", class)));
        }
        params.push(("order", "timestamp.desc".to_string()));
        params
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(Self::error_from(response).await)
    }

    async fn error_from(response: Response) -> StoreError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();

        let message = body
            .message
            .clone()
            .or_else(|| body.error.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.to_string()
                } else {
                    text.clone()
                }
            });

        if status == StatusCode::CONFLICT || body.reports_conflict() {
            return StoreError::AlreadyExists(message);
        }
        StoreError::Backend(message)
    }

    async fn json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Backend(format!("unexpected response body: {}", e)))
    }
}

#[async_trait]
impl ContentTable for SupabaseStore {
    async fn select(&self, filter: &ContentFilter) -> Result<Vec<ContentRecord>, StoreError> {
        let request = self
            .client
            .get(self.table_url())
            .query(&Self::select_params(filter));
        let response = self.send(request).await?;
        Self::json(response).await
    }

    async fn find(&self, id: &str) -> Result<Option<ContentRecord>, StoreError> {
        let request = self
            .client
            .get(self.table_url())
            .query(&[("select", "*".to_string()), ("id", format!("eq.{}", id))]);
        let response = self.send(request).await?;
        let rows: Vec<ContentRecord> = Self::json(response).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, row: NewContent) -> Result<ContentRecord, StoreError> {
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&[row]);
        let response = self.send(request).await?;
        let rows: Vec<ContentRecord> = Self::json(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("insert returned no rows".to_string()))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let request = self
            .client
            .delete(self.table_url())
            .query(&[("id", format!("eq.{}", id))]);
        self.send(request).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let request = self
            .client
            .get(self.table_url())
            .query(&[("select", "id"), ("limit", "1")]);
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl FileBucket for SupabaseStore {
    async fn upload(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), StoreError> {
        let mime = mime_guess::from_path(key).first_or_octet_stream();
        let request = self
            .client
            .post(self.object_url(bucket, key))
            .header(CONTENT_TYPE, mime.as_ref())
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(data);
        self.send(request).await?;
        Ok(())
    }

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let request = self
            .client
            .delete(self.endpoint(&["storage", "v1", "object", bucket]))
            .json(&serde_json::json!({ "prefixes": [key] }));
        self.send(request).await?;
        Ok(())
    }

    async fn fetch(&self, bucket: &str, key: &str) -> Result<Option<Bytes>, StoreError> {
        let request = self.client.get(self.public_url(bucket, key));
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Ok(None),
            s if s.is_success() => response
                .bytes()
                .await
                .map(Some)
                .map_err(|e| StoreError::Unavailable(e.to_string())),
            _ => Err(Self::error_from(response).await),
        }
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        self.endpoint(&["storage", "v1", "object", "public", bucket, key])
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use common::content::ContentType;

    use super::*;

    fn store() -> SupabaseStore {
        SupabaseStore::new(Url::parse("https://abc.supabase.co").unwrap(), "anon-key").unwrap()
    }

    #[test]
    fn test_endpoints() {
        let s = store();
        assert_eq!(
            s.table_url().as_str(),
            "https://abc.supabase.co/rest/v1/content"
        );
        assert_eq!(
            s.object_url("content-files", "1-a b.pdf").as_str(),
            "https://abc.supabase.co/storage/v1/object/content-files/1-a%20b.pdf"
        );
        assert_eq!(
            s.public_url("content-files", "1-a.pdf"),
            "https://abc.supabase.co/storage/v1/object/public/content-files/1-a.pdf"
        );
    }

    #[test]
    fn test_select_params() {
        let filter = ContentFilter::scope("CBSE", "Class 10").with_type(ContentType::Note);
        let params = SupabaseStore::select_params(&filter);
        assert_eq!(
            params,
            vec![
                ("select", "*".to_string()),
                ("type", "eq.note".to_string()),
                ("board", "eq.CBSE".to_string()),
                ("class", "eq.Class 10".to_string()),
                ("order", "timestamp.desc".to_string()),
            ]
        );

        let params = SupabaseStore::select_params(&ContentFilter::all());
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_conflict_detection() {
        let raw = r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#;
        let body: ErrorBody = serde_json::from_str(raw).unwrap();
        assert!(body.reports_conflict());

        let body: ErrorBody = serde_json::from_str(r#"{"message":"bad"}"#).unwrap();
        assert!(!body.reports_conflict());
    }

    #[test]
    fn test_rejects_non_base_url() {
        let url = Url::parse("mailto:admin@example.com").unwrap();
        assert!(matches!(
            SupabaseStore::new(url, "k"),
            Err(SupabaseError::BadUrl(_))
        ));
    }
}
