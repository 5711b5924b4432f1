use location_market::server::{self, AppState, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("📍 Location Market");
    info!("==================");

    let config = Config::from_env()?;
    let state = AppState::new(config).await?;
    info!("Catalog ready with {} locations", state.catalog.len());

    server::serve(state).await
}
