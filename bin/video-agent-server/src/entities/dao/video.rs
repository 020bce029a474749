use chrono::{DateTime, Utc};

/// A row in the `videos` table.
#[derive(Debug, Clone)]
pub struct Video {
    pub id: String,
    pub title: String,
    /// Path of the media file relative to the media root,
    /// e.g. `"videos/1f2e….mp4"`.
    pub file_path: String,
    /// Duration in seconds; `0.0` until probing succeeds.
    pub duration: f64,
    pub created_at: DateTime<Utc>,
}

/// A row in the `thumbnails` table.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub id: String,
    pub video_id: String,
    /// Timestamp the frame was taken at, in seconds.
    pub time_second: f64,
    /// Path relative to the media root, e.g. `"thumbnails/9a1c….jpg"`.
    pub image_path: String,
}
