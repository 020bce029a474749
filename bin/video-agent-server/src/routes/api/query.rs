//! One-shot question answering against a video transcript, without a chat
//! session.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::answer;
use crate::entities::TranscriptStore;
use crate::error::ServerError;
use crate::routes::api::videos::require_video;
use crate::schemas::api::query::{QueryRequest, QueryResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(post_query),
    components(schemas(QueryRequest, QueryResponse))
)]
pub struct QueryApi;

/// Register query routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/query", post(post_query))
}

#[utoipa::path(
    post,
    path = "/api/query",
    tag = "query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Question answered", body = QueryResponse),
        (status = 400, description = "Empty query"),
        (status = 404, description = "Video not found"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn post_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ServerError> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(ServerError::BadRequest("Query is empty".into()));
    }
    require_video(&state, &req.video_id).await?;

    let sentences = state.store.list_sentences(&req.video_id).await?;
    let result = answer::answer_query(&sentences, query);

    Ok(Json(QueryResponse {
        video_id: req.video_id,
        query: query.to_string(),
        answer: result.answer,
        timestamps: result.timestamps,
        steps: result.steps,
    }))
}
