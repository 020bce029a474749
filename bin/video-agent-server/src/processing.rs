//! Background media jobs.
//!
//! Each job gets a row in the `tasks` table and a tokio task whose abort
//! handle is registered with [`TaskManager`](crate::state::TaskManager),
//! so clients can poll and cancel through the tasks API. The blocking
//! ffmpeg work runs on the blocking thread pool.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use video_agent_media::slides::{self, SlideDetectOptions};
use video_agent_media::thumbs;

use crate::entities::dao::{Section, TaskRecord, Thumbnail, Video};
use crate::entities::{SectionStore, TaskStore, ThumbnailStore, VideoStore};
use crate::error::ServerError;
use crate::state::AppState;

pub const TASK_VIDEO_INGEST: &str = "video_ingest";
pub const TASK_THUMBNAILS: &str = "thumbnails";
pub const TASK_SECTIONS: &str = "sections";

/// Generate thumbnails and detect sections for a freshly uploaded video.
pub async fn spawn_video_ingest(
    state: Arc<AppState>,
    video: Video,
) -> Result<String, ServerError> {
    let task_id = new_task(&state, TASK_VIDEO_INGEST, &video.id).await?;
    let id = task_id.clone();
    let job_state = state.clone();
    let handle = tokio::spawn(async move {
        let result = async {
            let thumbs = run_thumbnails(&job_state, &video, None, None).await?;
            let sections = run_sections(&job_state, &video, SlideDetectOptions::default()).await?;
            Ok::<_, ServerError>(
                serde_json::json!({ "thumbnails": thumbs, "sections": sections }).to_string(),
            )
        }
        .await;
        finish_task(&job_state, &id, result).await;
    });
    state
        .task_manager
        .insert(task_id.as_str(), handle.abort_handle());
    Ok(task_id)
}

/// Regenerate thumbnails, optionally at explicit timestamps and width.
pub async fn spawn_thumbnail_rebuild(
    state: Arc<AppState>,
    video: Video,
    timestamps: Option<Vec<f64>>,
    width: Option<u32>,
) -> Result<String, ServerError> {
    let task_id = new_task(&state, TASK_THUMBNAILS, &video.id).await?;
    let id = task_id.clone();
    let job_state = state.clone();
    let handle = tokio::spawn(async move {
        let result = run_thumbnails(&job_state, &video, timestamps, width)
            .await
            .map(|count| serde_json::json!({ "thumbnails": count }).to_string());
        finish_task(&job_state, &id, result).await;
    });
    state
        .task_manager
        .insert(task_id.as_str(), handle.abort_handle());
    Ok(task_id)
}

/// Re-run slide detection and rebuild the section list.
pub async fn spawn_section_rebuild(
    state: Arc<AppState>,
    video: Video,
    opts: SlideDetectOptions,
) -> Result<String, ServerError> {
    let task_id = new_task(&state, TASK_SECTIONS, &video.id).await?;
    let id = task_id.clone();
    let job_state = state.clone();
    let handle = tokio::spawn(async move {
        let result = run_sections(&job_state, &video, opts)
            .await
            .map(|count| serde_json::json!({ "sections": count }).to_string());
        finish_task(&job_state, &id, result).await;
    });
    state
        .task_manager
        .insert(task_id.as_str(), handle.abort_handle());
    Ok(task_id)
}

async fn new_task(state: &AppState, task_type: &str, video_id: &str) -> Result<String, ServerError> {
    let task_id = Uuid::new_v4().to_string();
    let now = Utc::now();
    state
        .store
        .insert_task(TaskRecord {
            id: task_id.clone(),
            task_type: task_type.to_string(),
            status: "running".to_string(),
            input_data: Some(serde_json::json!({ "video_id": video_id }).to_string()),
            result_data: None,
            error_msg: None,
            created_at: now,
            updated_at: now,
        })
        .await?;
    info!(task_id = %task_id, task_type, video_id, "background task started");
    Ok(task_id)
}

async fn finish_task(state: &AppState, task_id: &str, result: Result<String, ServerError>) {
    let update = match result {
        Ok(result_data) => {
            info!(task_id, "background task succeeded");
            state
                .store
                .update_task_status(task_id, "succeeded", Some(&result_data), None)
                .await
        }
        Err(e) => {
            error!(task_id, error = %e, "background task failed");
            state
                .store
                .update_task_status(task_id, "failed", None, Some(&e.to_string()))
                .await
        }
    };
    if let Err(e) = update {
        error!(task_id, error = %e, "failed to persist task status");
    }
    state.task_manager.remove(task_id);
}

/// Absolute filesystem path of a media file stored relative to the media
/// root.
pub fn media_path(state: &AppState, relative: &str) -> PathBuf {
    PathBuf::from(&state.config.media_dir).join(relative)
}

async fn run_thumbnails(
    state: &AppState,
    video: &Video,
    timestamps: Option<Vec<f64>>,
    width: Option<u32>,
) -> Result<usize, ServerError> {
    let video_path = media_path(state, &video.file_path);
    let out_dir = state.config.thumbnails_dir();
    let width = width.unwrap_or(state.config.thumbnail_width);
    let timestamps = match timestamps {
        Some(ts) => ts,
        None => {
            let duration = resolve_duration(state, video).await?;
            thumbs::evenly_spaced(duration, state.config.thumbnail_count)
        }
    };

    let files = tokio::task::spawn_blocking(move || {
        thumbs::generate_thumbnails(&video_path, &timestamps, width, &out_dir)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("thumbnail job panicked: {e}")))??;

    let thumbnails: Vec<Thumbnail> = files
        .into_iter()
        .map(|f| Thumbnail {
            id: f.id.to_string(),
            video_id: video.id.clone(),
            time_second: f.time_second,
            image_path: format!(
                "thumbnails/{}",
                f.path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            ),
        })
        .collect();
    let count = thumbnails.len();
    state.store.replace_thumbnails(&video.id, thumbnails).await?;
    Ok(count)
}

async fn run_sections(
    state: &AppState,
    video: &Video,
    opts: SlideDetectOptions,
) -> Result<usize, ServerError> {
    let video_path = media_path(state, &video.file_path);
    let duration = resolve_duration(state, video).await?;

    let changes =
        tokio::task::spawn_blocking(move || slides::detect_slide_changes(&video_path, &opts))
            .await
            .map_err(|e| ServerError::Internal(format!("section job panicked: {e}")))??;

    let sections: Vec<Section> = slides::sections_from_changes(&changes, duration)
        .into_iter()
        .enumerate()
        .map(|(i, (begin_time, end_time))| Section {
            id: Uuid::new_v4().to_string(),
            video_id: video.id.clone(),
            title: format!("Section {}", i + 1),
            begin_time,
            end_time,
        })
        .collect();
    let count = sections.len();
    state.store.replace_sections(&video.id, sections).await?;
    Ok(count)
}

/// Duration from the database, probed with ffmpeg when the stored value is
/// missing. A successful probe is written back.
async fn resolve_duration(state: &AppState, video: &Video) -> Result<f64, ServerError> {
    if video.duration > 0.0 {
        return Ok(video.duration);
    }
    let video_path = media_path(state, &video.file_path);
    let duration =
        tokio::task::spawn_blocking(move || video_agent_media::probe::video_duration(&video_path))
            .await
            .map_err(|e| ServerError::Internal(format!("probe job panicked: {e}")))??;
    if let Err(e) = state.store.update_video_duration(&video.id, duration).await {
        warn!(video_id = %video.id, error = %e, "failed to persist probed duration");
    }
    Ok(duration)
}
