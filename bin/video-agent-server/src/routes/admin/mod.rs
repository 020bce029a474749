pub mod ingest;

use crate::middleware::auth;
use crate::state::AppState;

use axum::{
    middleware::{self},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

/// Routes nested under `/admin` (transcript import, artifact rebuilds).
pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .merge(ingest::router())
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::check_admin_auth,
        ))
}

#[derive(OpenApi)]
#[openapi()]
pub struct AdminApi;

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut spec = AdminApi::openapi();
    spec.merge(ingest::IngestApi::openapi());
    spec
}
