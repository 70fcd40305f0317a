use clap::Args;

use ideal_daemon::http_server::api::HealthRequest;
use ideal_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Health check failed: {0}")]
    Failed(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = Vec::new();

        // 1. Check config directory
        lines.push("Config:".to_string());
        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:    {}", state.ideal_dir.display()));
                lines.push("  config.toml:  OK".to_string());
                lines.push(format!("  api_url:      {}", state.config.api_url));
                lines.push(format!("  admin_email:  {}", state.config.admin_email));
                let token = if state.config.admin_token.is_some() { "set" } else { "not set" };
                lines.push(format!("  admin_token:  {}", token));
                match state.session() {
                    Ok(Some(session)) => lines.push(format!("  session:      {}", session.email)),
                    Ok(None) => lines.push("  session:      none".to_string()),
                    Err(e) => lines.push(format!("  session:      error: {}", e)),
                }
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }

        // 2. Check server liveness and readiness
        let base = ctx.client.base_url();
        let client = ctx.client.http_client();

        lines.push(String::new());
        lines.push(format!("Server ({}):", base));

        for endpoint in ["livez", "readyz"] {
            let url = format!("{}/_status/{}", base.as_str().trim_end_matches('/'), endpoint);
            let line = match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => format!("  {:<7} OK", endpoint),
                Ok(resp) => format!("  {:<7} UNHEALTHY ({})", endpoint, resp.status()),
                Err(_) => format!("  {:<7} NOT REACHABLE", endpoint),
            };
            lines.push(line);
        }

        // 3. Check the public health route
        match ctx.client.call(HealthRequest).await {
            Ok(health) => lines.push(format!("  api:    {} ({})", health.status, health.timestamp)),
            Err(e) => lines.push(format!("  api:    {}", e)),
        }

        Ok(lines.join("\n"))
    }
}
