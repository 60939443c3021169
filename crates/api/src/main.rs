use std::sync::Arc;

use anyhow::Context;

use flatshare_api::{app, settings::ApiSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    flatshare_observability::init();

    let settings = ApiSettings::from_env().context("invalid configuration")?;
    let services = Arc::new(app::services::build_services(&settings).await?);
    let router = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router).await?;
    Ok(())
}
