//! garment-web
//!
//! Serves the image generation proxy. Configuration comes from the
//! environment (see `garment_studio::config`), optionally via `.env`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use garment_studio::api::create_app_router;
use garment_studio::config::{GenerationConfig, ServerConfig};
use garment_studio::generation::{GenerationOrchestrator, OpenAiImageClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "garment_web=debug,garment_studio=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting garment-web");

    let generation = GenerationConfig::from_env().context("loading generation config")?;
    let server = ServerConfig::from_env().context("loading server config")?;
    tracing::info!(
        base_url = %generation.base_url,
        model = %generation.model,
        max_attempts = generation.max_attempts,
        "Image provider configured"
    );

    let client = OpenAiImageClient::new(generation.api_key.clone(), generation.base_url.clone())
        .context("building image provider client")?;
    let orchestrator = Arc::new(
        GenerationOrchestrator::new(Arc::new(client), generation.retry_policy())
            .with_model(generation.model.clone()),
    );

    let app = create_app_router(orchestrator, server.body_limit_bytes);
    let addr = SocketAddr::from(([0, 0, 0, 0], server.port));

    tracing::info!("Server started on http://{}", addr);
    tracing::info!("  GET  /              - liveness");
    tracing::info!("  GET  /api/v1/dalle  - liveness");
    tracing::info!("  POST /api/v1/dalle  - generate image");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!("Port {} is already in use", server.port);
            }
            return Err(e).with_context(|| format!("binding {}", addr));
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        return Err(e).context("serving HTTP");
    }

    Ok(())
}
