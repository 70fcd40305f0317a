use clap::Args;

use common::content::ContentType;
use common::view::{Navigator, ViewError};
use ideal_daemon::http_server::api::client::ApiError;
use ideal_daemon::http_server::api::ScopedRequest;
use ideal_daemon::state::AppState;

use super::content::render_records;

/// Open a class dashboard: records for one board, class and type.
#[derive(Args, Debug, Clone)]
pub struct Browse {
    /// Board, e.g. "CBSE"
    pub board: String,

    /// Class within the board, e.g. "Class 10"
    pub class: String,

    /// Dashboard tab
    #[arg(long = "type", value_name = "TYPE", default_value_t = ContentType::Quiz)]
    pub content_type: ContentType,
}

#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    #[error(transparent)]
    View(#[from] ViewError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Browse {
    type Error = BrowseError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = AppState::load(ctx.config_path.clone())
            .ok()
            .and_then(|state| state.session().ok().flatten());
        let is_admin = session.is_some();

        let mut nav = Navigator::new(session);
        nav.select_board(&self.board)?;
        nav.select_class(&self.class)?;
        let scope = nav.filter(self.content_type)?;

        let response = ctx
            .client
            .call(ScopedRequest {
                board: scope.board.clone(),
                class: scope.class.clone(),
                content_type: Some(scope.content_type),
            })
            .await?;

        let header = format!(
            "{} / {} / {}",
            scope.board, scope.class, scope.content_type
        );
        if response.data.is_empty() {
            return Ok(format!("{}\nNo content available yet.", header));
        }
        Ok(format!(
            "{}\n{}",
            header,
            render_records(&response.data, is_admin)
        ))
    }
}
