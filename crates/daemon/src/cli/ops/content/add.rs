use std::path::PathBuf;

use clap::Args;

use common::content::{ContentDraft, ContentType};
use ideal_daemon::http_server::api::client::ApiError;
use ideal_daemon::http_server::api::upload::EncodedFile;
use ideal_daemon::http_server::api::CreateRequest;

use crate::cli::op::AdminAccessError;

#[derive(Args, Debug, Clone)]
pub struct Add {
    #[arg(long = "type", value_name = "TYPE", default_value_t = ContentType::Quiz)]
    pub content_type: ContentType,

    #[arg(long)]
    pub title: String,

    /// External link (quiz form, course page, ...)
    #[arg(long)]
    pub link: Option<String>,

    /// File to upload instead of a link
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[arg(long, default_value = "")]
    pub board: String,

    #[arg(long, default_value = "")]
    pub class: String,

    /// Quiz duration in minutes
    #[arg(long)]
    pub time: Option<String>,

    /// Quiz total marks
    #[arg(long)]
    pub marks: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AddError {
    #[error(transparent)]
    Access(#[from] AdminAccessError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Add {
    type Error = AddError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let client = ctx.admin_client()?;

        let file = match &self.file {
            Some(path) => {
                let data = tokio::fs::read(path).await.map_err(|source| AddError::ReadFile {
                    path: path.clone(),
                    source,
                })?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Some(EncodedFile::encode(name, &data))
            }
            None => None,
        };

        let request = CreateRequest {
            draft: ContentDraft {
                content_type: self.content_type,
                title: self.title.clone(),
                link: self.link.clone(),
                board: self.board.clone(),
                class: self.class.clone(),
                time: self.time.clone(),
                marks: self.marks.clone(),
            },
            file,
        };

        let response = client.call(request).await?;
        Ok(format!(
            "{}\n  id:   {}\n  link: {}",
            response.message, response.data.id, response.data.link
        ))
    }
}
