use clap::Args;

use ideal_daemon::http_server::api::client::ApiError;
use ideal_daemon::http_server::api::QuoteRequest;

#[derive(Args, Debug, Clone)]
pub struct Quote;

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Quote {
    type Error = QuoteError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(QuoteRequest).await?;
        Ok(response.quote)
    }
}
