use clap::Args;

use common::gate::AuthError;
use ideal_daemon::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Login {
    /// Operator email
    #[arg(long)]
    pub email: String,

    /// Operator password
    #[arg(long)]
    pub password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Login {
    type Error = LoginError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let session = state.admin_gate().login(&self.email, &self.password)?;
        state.save_session(&session)?;
        Ok(format!("Logged in as {}", session.email))
    }
}
