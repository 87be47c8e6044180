//! HTTP surface
//!
//! `GET /` and `GET /api/v1/dalle` are liveness probes; `POST /api/v1/dalle`
//! runs a generation through the [`GenerationOrchestrator`].

pub mod dalle_routes;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use garment_types::MessageResponse;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::generation::GenerationOrchestrator;

pub use dalle_routes::{create_dalle_router, DalleState};

pub const ROOT_MESSAGE: &str = "Hello from DALL.E";

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

/// Full application router with body limit, tracing and permissive CORS.
pub fn create_app_router(orchestrator: Arc<GenerationOrchestrator>, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/api/v1/dalle", create_dalle_router(orchestrator))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
