//! Gateway server binary.

use anyhow::Context;
use std::sync::Arc;
use tgi_gateway::adapter::ChatAdapter;
use tgi_gateway::backend::TgiClient;
use tgi_gateway::config::GatewayConfig;
use tgi_gateway::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = GatewayConfig::from_env().context("loading gateway configuration")?;
    let backend =
        TgiClient::new(config.tgi_url.as_str()).context("constructing backend client")?;
    let adapter = Arc::new(ChatAdapter::new(Arc::new(backend)));

    let app = server::router(adapter, &config);
    info!(addr = %config.bind_addr, tgi_url = %config.tgi_url, "gateway listening");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .context("binding listener")?;
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
