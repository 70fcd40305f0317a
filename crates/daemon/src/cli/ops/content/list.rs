use clap::Args;

use common::content::ContentType;
use ideal_daemon::http_server::api::client::ApiError;
use ideal_daemon::http_server::api::ListAllRequest;

use super::render_records;

#[derive(Args, Debug, Clone)]
pub struct List {
    /// Only records of this type
    #[arg(long = "type", value_name = "TYPE")]
    pub content_type: Option<ContentType>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for List {
    type Error = ListError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(ListAllRequest).await?;
        let records: Vec<_> = response
            .data
            .into_iter()
            .filter(|r| self.content_type.map_or(true, |t| r.content_type == t))
            .collect();

        if records.is_empty() {
            return Ok("No content found".to_string());
        }
        Ok(render_records(&records, true))
    }
}
