// src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use salon_backend::{build_router, config::{AppState, Settings}};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;
    let store = settings.connect_store().await?;
    let notifier = settings.notifier();
    let bind_addr = settings.bind_addr.clone();

    let app_state = AppState::build(settings, store, notifier).await?;
    let app = build_router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
