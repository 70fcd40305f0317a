use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("invalid admin token: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),
    /// The server answered with an error envelope.
    #[error("{message} (HTTP {status})")]
    Api { status: StatusCode, message: String },
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
}
