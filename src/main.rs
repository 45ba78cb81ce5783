use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fortigate_exporter::{AuthKeys, ExporterConfig, ExporterServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ExporterConfig::parse();

    let auth = AuthKeys::load(&config.auth_file)
        .with_context(|| format!("loading auth keys from {}", config.auth_file.display()))?;
    if auth.is_empty() {
        anyhow::bail!("auth file {} contains no targets", config.auth_file.display());
    }
    info!(targets = auth.len(), "loaded auth keys");

    let http = config
        .build_http_client()
        .context("building device HTTP client")?;

    let server = ExporterServer::new(
        config.listen_address,
        Arc::new(auth),
        http,
        config.scrape_timeout(),
    );
    server
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}
