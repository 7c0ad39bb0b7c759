//! Video lookup route

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use nicometa_providers::NormalizedVideo;

use crate::http::{ApiError, ApiResult, AppState};

pub fn video_routes() -> Router<AppState> {
    Router::new().route("/video/{id}", get(get_video))
}

/// `GET /video/{id}`
async fn get_video(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<NormalizedVideo>> {
    // A segment that fails to decode can never be a valid id
    let Path(id) = id.map_err(|rejection| ApiError::invalid_id(rejection.body_text()))?;

    let video = state.lookup.lookup(&id).await?;
    Ok(Json(video))
}
