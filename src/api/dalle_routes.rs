//! Image generation endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use garment_types::{GenerateImageRequest, MessageResponse, PhotoResponse};
use tracing::{info, warn};

use crate::generation::{ErrorKind, GenerationError, GenerationOrchestrator};

pub const ROUTES_MESSAGE: &str = "Hello from DALL.E ROUTES";

#[derive(Clone)]
pub struct DalleState {
    orchestrator: Arc<GenerationOrchestrator>,
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}

/// GET /api/v1/dalle
async fn probe() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: ROUTES_MESSAGE.to_string(),
    })
}

/// POST /api/v1/dalle
async fn generate_image(
    State(state): State<DalleState>,
    body: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Json<PhotoResponse>, GenerationError> {
    // Unreadable bodies get the same envelope as provider failures.
    let Json(req) = body.map_err(|rejection| {
        warn!(status = rejection.status().as_u16(), error = %rejection, "Rejected generation body");
        GenerationError::from_kind(ErrorKind::InvalidRequest)
    })?;
    info!(prompt_len = req.prompt.len(), "Image generation requested");
    let photo = state.orchestrator.generate(&req.prompt).await?;
    Ok(Json(PhotoResponse { photo }))
}

pub fn create_dalle_router(orchestrator: Arc<GenerationOrchestrator>) -> Router {
    Router::new()
        .route("/", get(probe).post(generate_image))
        .with_state(DalleState { orchestrator })
}
