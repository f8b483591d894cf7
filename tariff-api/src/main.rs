use std::net::SocketAddr;

use anyhow::Context;
use tariff_api::{app, AppState};
use tariff_store::app_config::Config;
use tariff_store::CatalogRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tariff_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting tariff API on port {}", config.server.port);

    let dataset = CatalogRepository::new(config.catalog.clone())
        .load()
        .await
        .context("Failed to load rate catalog")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let app = app(AppState::new(config, dataset));

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
