use std::path::PathBuf;

use clap::Args;

use ideal_daemon::http_server::api::client::ApiError;
use ideal_daemon::http_server::api::upload::EncodedFile;
use ideal_daemon::http_server::api::UploadRequest;

use crate::cli::op::AdminAccessError;

/// Upload a file to storage without creating a record.
#[derive(Args, Debug, Clone)]
pub struct Upload {
    pub path: PathBuf,

    /// Target bucket (defaults to content-files)
    #[arg(long)]
    pub bucket: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
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
impl crate::cli::op::Op for Upload {
    type Error = UploadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let client = ctx.admin_client()?;

        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|source| UploadError::ReadFile {
                path: self.path.clone(),
                source,
            })?;
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let stored = client
            .call(UploadRequest {
                file: EncodedFile::encode(name, &data),
                bucket: self.bucket.clone(),
            })
            .await?;

        Ok(format!(
            "Uploaded {}\n  storage path: {}\n  public url:   {}",
            stored.file_name, stored.storage_path, stored.public_url
        ))
    }
}
