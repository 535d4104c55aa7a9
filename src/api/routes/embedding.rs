use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::{error::ApiError, extract::AppJson, state::AppState};
use crate::domain::{list_models, ComparisonRequest, ComparisonResponse, ModelDescriptor};

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelDescriptor>,
}

pub async fn get_models() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: list_models(),
    })
}

pub async fn compare_embeddings(
    State(state): State<AppState>,
    AppJson(request): AppJson<ComparisonRequest>,
) -> Result<Json<ComparisonResponse>, ApiError> {
    let response = state.comparison.compare(request).await?;
    Ok(Json(response))
}
