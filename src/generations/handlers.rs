use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{
    HistoryQuery, HistoryResponse, ImageGenerationPayload, ImageGenerationResponse,
    TextGenerationPayload, TextGenerationResponse,
};
use super::services;
use crate::{error::ApiError, state::AppState};

pub fn generation_routes() -> Router<AppState> {
    Router::new()
        .route("/ai/text", post(generate_text))
        .route("/ai/image", post(generate_image))
        .route("/ai/generations", get(list_generations))
}

/// POST /ai/text
#[instrument(skip(state, payload))]
pub async fn generate_text(
    State(state): State<AppState>,
    payload: Result<Json<TextGenerationPayload>, JsonRejection>,
) -> Result<Json<TextGenerationResponse>, ApiError> {
    let Json(payload) = payload?;
    let text = services::generate_text(&state, payload.try_into()?).await?;
    Ok(Json(TextGenerationResponse {
        success: true,
        text,
    }))
}

/// POST /ai/image
#[instrument(skip(state, payload))]
pub async fn generate_image(
    State(state): State<AppState>,
    payload: Result<Json<ImageGenerationPayload>, JsonRejection>,
) -> Result<Json<ImageGenerationResponse>, ApiError> {
    let Json(payload) = payload?;
    let url = services::generate_image(&state, payload.try_into()?).await?;
    Ok(Json(ImageGenerationResponse { success: true, url }))
}

/// GET /ai/generations?userId=...
#[instrument(skip(state, query))]
pub async fn list_generations(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Query(q) = query?;
    let generations = state.store.list_generations_by_user(q.owner())?;
    Ok(Json(HistoryResponse {
        success: true,
        generations,
    }))
}
