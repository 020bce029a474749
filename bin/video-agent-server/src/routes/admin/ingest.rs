//! Admin ingest routes – transcript import and artifact rebuilds.
//!
//! The transcript import accepts the result document of an external
//! speech-recognition pipeline and replaces the stored transcript. The
//! rebuild endpoints start background tasks and return 202 with a task ID
//! for polling via `/api/tasks`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

use video_agent_media::slides::SlideDetectOptions;

use crate::entities::{TranscriptSentence, TranscriptStore, VideoTranscript};
use crate::error::ServerError;
use crate::processing;
use crate::routes::api::videos::require_video;
use crate::schemas::admin::ingest::{
    AsrResultDocument, RebuildSectionsRequest, RebuildThumbnailsRequest, TaskAcceptedResponse,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(put_transcript, rebuild_thumbnails, rebuild_sections),
    components(schemas(
        AsrResultDocument,
        RebuildThumbnailsRequest,
        RebuildSectionsRequest,
        TaskAcceptedResponse
    ))
)]
pub struct IngestApi;

/// Register admin ingest routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/videos/{id}/transcript", put(put_transcript))
        .route("/videos/{id}/thumbnails/rebuild", post(rebuild_thumbnails))
        .route("/videos/{id}/sections/rebuild", post(rebuild_sections))
}

/// Import a speech-recognition result (`PUT /admin/videos/{id}/transcript`).
///
/// Upserts the transcript header and replaces the sentences of every
/// channel present in the document. Channels absent from the document are
/// left untouched.
#[utoipa::path(
    put,
    path = "/admin/videos/{id}/transcript",
    tag = "admin",
    request_body = AsrResultDocument,
    responses(
        (status = 200, description = "Transcript imported", body = serde_json::Value),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 404, description = "Video not found"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn put_transcript(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(doc): Json<AsrResultDocument>,
) -> Result<Json<serde_json::Value>, ServerError> {
    require_video(&state, &id).await?;

    state
        .store
        .upsert_transcript(VideoTranscript {
            video_id: id.clone(),
            file_url: doc.file_url.clone(),
            format: doc.audio_info.format.clone(),
            sample_rate: doc.audio_info.sample_rate,
        })
        .await?;

    let mut channels = 0usize;
    let mut sentence_count = 0usize;
    for channel in &doc.transcripts {
        let sentences: Vec<TranscriptSentence> = channel
            .sentences
            .iter()
            .map(|s| TranscriptSentence {
                id: Uuid::new_v4().to_string(),
                video_id: id.clone(),
                channel_id: channel.channel_id,
                sentence_id: s.sentence_id,
                begin_time: s.begin_time,
                end_time: s.end_time,
                language: s.language.clone(),
                emotion: s.emotion.clone(),
                text: s.text.clone(),
            })
            .collect();
        sentence_count += sentences.len();
        channels += 1;
        state
            .store
            .replace_channel_sentences(&id, channel.channel_id, sentences)
            .await?;
    }

    info!(video_id = %id, channels, sentences = sentence_count, "transcript imported");
    Ok(Json(serde_json::json!({
        "video_id": id,
        "channels": channels,
        "sentences": sentence_count,
    })))
}

#[utoipa::path(
    post,
    path = "/admin/videos/{id}/thumbnails/rebuild",
    tag = "admin",
    request_body = RebuildThumbnailsRequest,
    responses(
        (status = 202, description = "Rebuild task accepted", body = TaskAcceptedResponse),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 404, description = "Video not found"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn rebuild_thumbnails(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<RebuildThumbnailsRequest>,
) -> Result<(StatusCode, Json<TaskAcceptedResponse>), ServerError> {
    let video = require_video(&state, &id).await?;

    if let Some(timestamps) = &req.timestamps {
        if timestamps.is_empty() {
            return Err(ServerError::BadRequest("timestamps is empty".into()));
        }
        if timestamps.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(ServerError::BadRequest(
                "timestamps must be non-negative finite seconds".into(),
            ));
        }
    }
    if req.width == Some(0) {
        return Err(ServerError::BadRequest("width must be positive".into()));
    }

    let task_id =
        processing::spawn_thumbnail_rebuild(state.clone(), video, req.timestamps, req.width)
            .await?;
    Ok((StatusCode::ACCEPTED, Json(TaskAcceptedResponse { task_id })))
}

#[utoipa::path(
    post,
    path = "/admin/videos/{id}/sections/rebuild",
    tag = "admin",
    request_body = RebuildSectionsRequest,
    responses(
        (status = 202, description = "Rebuild task accepted", body = TaskAcceptedResponse),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 404, description = "Video not found"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn rebuild_sections(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<RebuildSectionsRequest>,
) -> Result<(StatusCode, Json<TaskAcceptedResponse>), ServerError> {
    let video = require_video(&state, &id).await?;

    let mut opts = SlideDetectOptions::default();
    if let Some(threshold) = req.similarity_threshold {
        opts.similarity_threshold = threshold;
    }
    if let Some(interval) = req.min_interval_sec {
        opts.min_interval_sec = interval;
    }
    opts.validate()
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;

    let task_id = processing::spawn_section_rebuild(state.clone(), video, opts).await?;
    Ok((StatusCode::ACCEPTED, Json(TaskAcceptedResponse { task_id })))
}
