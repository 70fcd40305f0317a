use clap::Args;

use ideal_daemon::http_server::api::client::ApiError;
use ideal_daemon::http_server::api::DeleteRequest;

use crate::cli::op::AdminAccessError;

#[derive(Args, Debug, Clone)]
pub struct Rm {
    #[command(flatten)]
    pub request: DeleteRequest,
}

#[derive(Debug, thiserror::Error)]
pub enum RmError {
    #[error(transparent)]
    Access(#[from] AdminAccessError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Rm {
    type Error = RmError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let client = ctx.admin_client()?;
        let response = client.call(self.request.clone()).await?;
        Ok(format!("{} ({})", response.message, self.request.id))
    }
}
