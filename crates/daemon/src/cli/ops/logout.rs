use clap::Args;

use ideal_daemon::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Logout;

#[derive(Debug, thiserror::Error)]
pub enum LogoutError {
    #[error("state error: {0}")]
    State(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Logout {
    type Error = LogoutError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        if state.clear_session()? {
            Ok("Logged out".to_string())
        } else {
            Ok("No active session".to_string())
        }
    }
}
