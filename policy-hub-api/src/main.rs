//! Policy Hub - Main Application Entry Point
//!
//! Serves the hub client and a policy store over HTTP.

use anyhow::Context;
use policy_hub_api::AppState;
use policy_hub_core::HubConfig;
use policy_hub_storage::{HttpPolicyStore, InMemoryPolicyStore, PolicyStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,policy_hub=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .context("PORT must be a valid u16")?;

    let config = HubConfig::from_env().context("failed to load hub configuration")?;
    tracing::info!("Using policy hub at {}", config.hub_url);
    if !config.verify_tls {
        tracing::warn!("TLS certificate verification is disabled");
    }

    // Initialize policy store backend
    let storage_type = std::env::var("STORAGE_TYPE").unwrap_or_else(|_| "memory".to_string());

    let store: Arc<dyn PolicyStore> = match storage_type.as_str() {
        "remote" => {
            let store = HttpPolicyStore::new(&config)
                .context("remote storage requires POLICY_API_URL")?;
            tracing::info!(
                "Using remote policy store at {}",
                config.api_url.as_deref().unwrap_or_default()
            );
            Arc::new(store)
        }
        "memory" => {
            tracing::info!("Initializing InMemory policy store...");
            Arc::new(InMemoryPolicyStore::new())
        }
        other => anyhow::bail!("unknown STORAGE_TYPE '{}' (expected memory or remote)", other),
    };

    // Create shared application state
    let app_state = Arc::new(AppState::with_store(config, store)?);

    let app = policy_hub_api::create_router(app_state);

    tracing::info!("Starting Policy Hub server on {}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
