//! Background task status and cancellation.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;

use crate::entities::{TaskRecord, TaskStore};
use crate::error::ServerError;
use crate::schemas::api::task::{TaskListQuery, TaskResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_tasks, get_task, cancel_task),
    components(schemas(TaskResponse))
)]
pub struct TasksApi;

/// Register task routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks))
        .route("/tasks/{id}", get(get_task))
        .route("/tasks/{id}/cancel", post(cancel_task))
}

#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "tasks",
    params(TaskListQuery),
    responses(
        (status = 200, description = "Task list retrieved", body = Vec<TaskResponse>),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskResponse>>, ServerError> {
    let tasks = state.store.list_tasks(query.task_type.as_deref()).await?;
    Ok(Json(tasks.iter().map(|t| t.to_response()).collect()))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = "tasks",
    responses(
        (status = 200, description = "Task retrieved", body = TaskResponse),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ServerError> {
    let task = require_task(&state, &id).await?;
    Ok(Json(task.to_response()))
}

/// Cancel a running task (`POST /api/tasks/{id}/cancel`).
///
/// The database status is updated first so the cancellation is recorded
/// even if the tokio task already finished and deregistered its handle.
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/cancel",
    tag = "tasks",
    responses(
        (status = 200, description = "Task cancelled", body = TaskResponse),
        (status = 400, description = "Task is not cancellable"),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn cancel_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ServerError> {
    let task = require_task(&state, &id).await?;
    if task.status != "pending" && task.status != "running" {
        return Err(ServerError::BadRequest(format!(
            "Task is {} and cannot be cancelled",
            task.status
        )));
    }

    state
        .store
        .update_task_status(&id, "cancelled", None, Some("cancelled by client"))
        .await?;
    let aborted = state.task_manager.cancel(&id);
    info!(task_id = %id, aborted, "task cancelled");

    let task = require_task(&state, &id).await?;
    Ok(Json(task.to_response()))
}

async fn require_task(state: &AppState, id: &str) -> Result<TaskRecord, ServerError> {
    state
        .store
        .get_task(id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Task not found: {id}")))
}
