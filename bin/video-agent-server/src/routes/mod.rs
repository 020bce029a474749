//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI spec endpoint (disable with `VIDEO_AGENT_ENABLE_SWAGGER=false`)
//! - Health / heartbeat route
//! - Public `/api` routes (videos, chats, query, tasks)
//! - Static `/media` file serving (uploaded videos, generated thumbnails)
//! - Admin `/admin` routes (optionally protected by bearer token)

mod admin;
mod api;
pub mod doc;
mod health;

use axum::{
    middleware::{self},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{cors, trace};
use crate::state::AppState;

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(health::router())
        .nest("/api", api::router())
        .nest("/admin", admin::router(state.clone()))
        .nest_service("/media", ServeDir::new(&state.config.media_dir));

    let mut app = Router::new().merge(api_router);

    // ── Swagger UI ────────────────────────────────────────────────────────────
    // Enabled by default; disable with VIDEO_AGENT_ENABLE_SWAGGER=false in
    // production to avoid exposing the API structure to potential attackers.
    let api_doc = doc::get_docs();

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api_doc));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(state.clone())))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}
