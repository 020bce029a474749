//! Video library routes – upload, listing, detail and derived artifacts
//! (thumbnails, transcript, sections).
//!
//! Uploads are multipart/form-data with a `file` field and an optional
//! `title` field. The file is streamed to the media directory with size and
//! MIME validation, then a background ingest task generates thumbnails and
//! detects sections.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tracing::{debug, info, warn};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::entities::{
    SectionStore, ThumbnailStore, TranscriptStore, Video, VideoStore,
};
use crate::error::ServerError;
use crate::processing;
use crate::schemas::api::video::{
    SectionResponse, ThumbnailResponse, TranscriptResponse, TranscriptSentenceResponse,
    UploadVideoResponse, VideoResponse,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_videos,
        upload_video,
        get_video,
        delete_video,
        list_thumbnails,
        get_transcript,
        list_sections
    ),
    components(schemas(
        VideoResponse,
        UploadVideoResponse,
        ThumbnailResponse,
        TranscriptResponse,
        TranscriptSentenceResponse,
        SectionResponse
    ))
)]
pub struct VideosApi;

// The real per-upload limit comes from config and is enforced while
// streaming; this only keeps axum from rejecting the body outright.
const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024 * 1024;

/// Register video routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/videos", get(list_videos))
        .route(
            "/videos/upload",
            post(upload_video).layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES)),
        )
        .route("/videos/{id}", get(get_video).delete(delete_video))
        .route("/videos/{id}/thumbnails", get(list_thumbnails))
        .route("/videos/{id}/transcript", get(get_transcript))
        .route("/videos/{id}/sections", get(list_sections))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "Video list retrieved", body = Vec<VideoResponse>),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<VideoResponse>>, ServerError> {
    let videos = state.store.list_videos().await?;
    let mut responses = Vec::with_capacity(videos.len());
    for video in videos {
        let thumbnails = state.store.list_thumbnails(&video.id).await?;
        responses.push(
            video.to_response(thumbnails.iter().map(|t| t.to_response()).collect()),
        );
    }
    Ok(Json(responses))
}

/// Upload a video file (`POST /api/videos/upload`).
///
/// Accepts multipart/form-data with a required `file` field and an optional
/// `title` field (falls back to the uploaded filename). The upload is
/// streamed to disk with size validation, its duration is probed with
/// ffmpeg, and a background ingest task is started.
///
/// # Security
/// - File size is validated during streaming (VIDEO_AGENT_MAX_UPLOAD_SIZE_MB)
/// - File type is validated (video/* MIME types only)
/// - Stored filenames are server-generated UUIDs; the client filename is
///   only used for the title and extension after sanitization
#[utoipa::path(
    post,
    path = "/api/videos/upload",
    tag = "videos",
    responses(
        (status = 201, description = "Video uploaded, ingest task started", body = UploadVideoResponse),
        (status = 400, description = "Bad request (invalid file, too large, or wrong type)"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadVideoResponse>), ServerError> {
    debug!("received multipart video upload");

    let max_upload_size_bytes = state.config.max_upload_size_mb * 1024 * 1024;
    let allowed_mime_types = [
        "video/mp4",
        "video/x-matroska",
        "video/webm",
        "video/quicktime",
        "video/x-msvideo",
        "video/mpeg",
    ];

    let mut title: Option<String> = None;
    let mut file_bytes: Vec<u8> = Vec::new();
    let mut file_name = String::new();

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        ServerError::BadRequest(format!("Failed to read multipart field: {e}"))
    })? {
        match field.name().unwrap_or("unknown") {
            "title" => {
                let text = field.text().await.map_err(|e| {
                    ServerError::BadRequest(format!("Failed to read title field: {e}"))
                })?;
                if !text.trim().is_empty() {
                    title = Some(text.trim().to_string());
                }
            }
            "file" => {
                file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();

                if !allowed_mime_types.contains(&content_type.as_str()) {
                    return Err(ServerError::BadRequest(format!(
                        "Unsupported file type: {content_type}. \
                         Supported formats: MP4, MKV, WebM, MOV, AVI, MPEG"
                    )));
                }

                // Stream the file data with size validation.
                while let Some(chunk) = field.chunk().await.map_err(|e| {
                    ServerError::BadRequest(format!("Failed to read file chunk: {e}"))
                })? {
                    file_bytes.extend_from_slice(&chunk);
                    if file_bytes.len() > max_upload_size_bytes {
                        return Err(ServerError::BadRequest(format!(
                            "File too large: {} bytes exceeds maximum of {}MB",
                            file_bytes.len(),
                            state.config.max_upload_size_mb
                        )));
                    }
                }

                debug!(
                    file_name = %file_name,
                    content_type = %content_type,
                    size_bytes = file_bytes.len(),
                    "received file upload"
                );
            }
            other => {
                return Err(ServerError::BadRequest(format!("Unknown field: {other}")));
            }
        }
    }

    if file_bytes.is_empty() {
        return Err(ServerError::BadRequest("No file uploaded".into()));
    }

    // Server-generated storage name; only the extension survives from the
    // client filename.
    let video_id = Uuid::new_v4().to_string();
    let extension = storage_extension(&file_name);
    let relative_path = format!("videos/{video_id}.{extension}");
    let absolute_path = processing::media_path(&state, &relative_path);

    if let Some(parent) = absolute_path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            ServerError::Internal(format!("Failed to create media directory: {e}"))
        })?;
    }
    tokio::fs::write(&absolute_path, &file_bytes)
        .await
        .map_err(|e| ServerError::Internal(format!("Failed to write uploaded file: {e}")))?;

    info!(
        video_id = %video_id,
        path = %absolute_path.display(),
        original_name = %file_name,
        size_bytes = file_bytes.len(),
        "saved uploaded video"
    );

    // Probe the duration up front so the UI can show it immediately; a
    // failed probe is retried by the ingest task.
    let probe_path = absolute_path.clone();
    let duration = tokio::task::spawn_blocking(move || {
        video_agent_media::probe::video_duration(&probe_path)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("probe job panicked: {e}")))?
    .unwrap_or_else(|e| {
        warn!(video_id = %video_id, error = %e, "duration probe failed; storing 0");
        0.0
    });

    let video = Video {
        id: video_id.clone(),
        title: title.unwrap_or_else(|| display_title(&file_name)),
        file_path: relative_path,
        duration,
        created_at: Utc::now(),
    };
    state.store.insert_video(video.clone()).await?;

    let task_id = processing::spawn_video_ingest(state.clone(), video.clone()).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadVideoResponse {
            video: video.to_response(Vec::new()),
            task_id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}",
    tag = "videos",
    responses(
        (status = 200, description = "Video retrieved", body = VideoResponse),
        (status = 404, description = "Video not found"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VideoResponse>, ServerError> {
    let video = require_video(&state, &id).await?;
    let thumbnails = state.store.list_thumbnails(&id).await?;
    Ok(Json(
        video.to_response(thumbnails.iter().map(|t| t.to_response()).collect()),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/videos/{id}",
    tag = "videos",
    responses(
        (status = 200, description = "Video deleted", body = serde_json::Value),
        (status = 404, description = "Video not found"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let video = require_video(&state, &id).await?;
    let thumbnails = state.store.list_thumbnails(&id).await?;

    // Delete database rows first (thumbnails and sentences cascade), then
    // remove files; a failed file removal only leaves an orphan on disk.
    state.store.delete_video(&id).await?;

    for thumb in &thumbnails {
        let path = processing::media_path(&state, &thumb.image_path);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %e, "failed to remove thumbnail file");
        }
    }
    let video_path = processing::media_path(&state, &video.file_path);
    if let Err(e) = tokio::fs::remove_file(&video_path).await {
        warn!(path = %video_path.display(), error = %e, "failed to remove video file");
    }

    info!(video_id = %id, "video deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}/thumbnails",
    tag = "videos",
    responses(
        (status = 200, description = "Thumbnail list retrieved", body = Vec<ThumbnailResponse>),
        (status = 404, description = "Video not found"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn list_thumbnails(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ThumbnailResponse>>, ServerError> {
    require_video(&state, &id).await?;
    let thumbnails = state.store.list_thumbnails(&id).await?;
    Ok(Json(thumbnails.iter().map(|t| t.to_response()).collect()))
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}/transcript",
    tag = "videos",
    responses(
        (status = 200, description = "Transcript retrieved", body = TranscriptResponse),
        (status = 404, description = "Video or transcript not found"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn get_transcript(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TranscriptResponse>, ServerError> {
    require_video(&state, &id).await?;
    let transcript = state
        .store
        .get_transcript(&id)
        .await?
        .ok_or_else(|| {
            ServerError::NotFound("No transcript found for this video.".into())
        })?;
    let sentences = state.store.list_sentences(&id).await?;
    Ok(Json(
        transcript.to_response(sentences.iter().map(|s| s.to_response()).collect()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}/sections",
    tag = "videos",
    responses(
        (status = 200, description = "Section list retrieved", body = Vec<SectionResponse>),
        (status = 404, description = "Video not found"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn list_sections(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<SectionResponse>>, ServerError> {
    require_video(&state, &id).await?;
    let sections = state.store.list_sections(&id).await?;
    Ok(Json(sections.iter().map(|s| s.to_response()).collect()))
}

/// Look up a video or fail with 404.
pub async fn require_video(state: &AppState, id: &str) -> Result<Video, ServerError> {
    state
        .store
        .get_video(id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Video not found: {id}")))
}

/// Sanitize a filename to prevent directory traversal
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Extension for the stored file, taken from the client filename; falls
/// back to `mp4` when the name carries no usable extension.
fn storage_extension(file_name: &str) -> String {
    sanitize_filename(file_name)
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|e| !e.is_empty() && e.len() <= 8)
        .unwrap_or_else(|| "mp4".to_string())
}

/// Human-readable title derived from the uploaded filename.
fn display_title(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    if stem.trim().is_empty() {
        "Untitled video".to_string()
    } else {
        stem.replace(['_', '-'], " ").trim().to_string()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sanitize_filename_replaces_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("lecture 01.mp4"), "lecture_01.mp4");
    }

    #[test]
    fn storage_extension_falls_back_without_a_dot() {
        assert_eq!(storage_extension("upload"), "mp4");
        assert_eq!(storage_extension("clip."), "mp4");
        assert_eq!(storage_extension("Recording.MKV"), "mkv");
        assert_eq!(storage_extension("weird.extension-name"), "mp4");
    }

    #[test]
    fn display_title_strips_extension_and_separators() {
        assert_eq!(display_title("intro_to_rust.mp4"), "intro to rust");
        assert_eq!(display_title("talk-recording.webm"), "talk recording");
        assert_eq!(display_title(".mp4"), "Untitled video");
    }
}
