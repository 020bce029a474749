pub mod chats;
pub mod query;
pub mod tasks;
pub mod videos;

use crate::state::AppState;
use utoipa::OpenApi;

use axum::Router;
use std::sync::Arc;

/// Routes nested under `/api`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(videos::router())
        .merge(chats::router())
        .merge(query::router())
        .merge(tasks::router())
}

#[derive(OpenApi)]
#[openapi()]
pub struct PublicApi;

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut spec = PublicApi::openapi();
    spec.merge(videos::VideosApi::openapi());
    spec.merge(chats::ChatsApi::openapi());
    spec.merge(query::QueryApi::openapi());
    spec.merge(tasks::TasksApi::openapi());
    spec
}
