#[allow(clippy::module_inception)]
mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder;
}

/// `<base>/api/<segments...>`, percent-encoding each segment.
pub fn api_url(base_url: &Url, segments: &[&str]) -> Url {
    let mut url = base_url.clone();
    url.set_query(None);
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().push("api").extend(segments);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let base = Url::parse("http://localhost:3000").unwrap();
        assert_eq!(
            api_url(&base, &["content", "abc"]).as_str(),
            "http://localhost:3000/api/content/abc"
        );

        let prefixed = Url::parse("https://portal.example/ideal/").unwrap();
        assert_eq!(
            api_url(&prefixed, &["quotes"]).as_str(),
            "https://portal.example/ideal/api/quotes"
        );
    }
}
