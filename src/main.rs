use anyhow::Context;
use linkedin_marketing_tools::observability::init_tracing;
use linkedin_marketing_tools::{ApiClients, LinkedInConfig, ToolRegistry, ToolServer};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = LinkedInConfig::from_env().context("invalid LinkedIn configuration")?;
    init_tracing(config.debug());

    let clients = ApiClients::from_config(&config).context("failed to build HTTP client")?;
    if !clients.has_community_credential() {
        tracing::info!("No community access token set; page and post tools use the primary token");
    }

    let server = ToolServer::new(ToolRegistry::with_default_tools(), Arc::new(clients));
    server.serve_stdio().await.context("tool server stopped")?;

    tracing::info!("Input closed, shutting down");
    Ok(())
}
