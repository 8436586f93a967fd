use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use anyhow::{Context, Result};
use consul_registryd::api;
use consul_registryd::config::Config;
use consul_registryd::consul::ConsulClient;
use consul_registryd::Controller;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("consul_registryd=info"))
        )
        .init();

    tracing::info!("Starting consul-registryd");

    // Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/consul-registry/registryd.toml".to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    tracing::info!("Loaded config from {}", config_path);

    // Build Consul client and controller
    let client = ConsulClient::new(
        &config.consul.endpoint,
        config.consul.datacenter.as_str(),
        config.consul.timeout(),
    )
    .with_context(|| format!("Invalid Consul settings for {}", config.consul.endpoint))?;

    let controller = Controller::with_registry(
        Arc::new(client),
        config.mesh.codec(),
        config.mesh.translator()?,
    );

    tracing::info!(
        "Using Consul at {} (datacenter {:?}), domain {}",
        config.consul.endpoint,
        config.consul.datacenter,
        config.mesh.domain
    );

    // Build API router
    let app = api::routes::router(api::routes::AppState {
        controller: Arc::new(controller),
    });

    // Bind HTTP server
    let listener = tokio::net::TcpListener::bind(&config.api.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", config.api.listen))?;

    tracing::info!("API listening on {}", config.api.listen);

    // Create cancellation token for graceful shutdown
    let cancel = CancellationToken::new();

    // Run server with graceful shutdown
    let server_cancel = cancel.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutdown signal received");

    // Trigger cancellation
    cancel.cancel();
    let _ = server_handle.await;

    tracing::info!("Shutdown complete");
    Ok(())
}
