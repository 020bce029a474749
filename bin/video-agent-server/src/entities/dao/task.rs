use chrono::{DateTime, Utc};

/// A row in the `tasks` table – bookkeeping for background media jobs
/// (thumbnail generation, slide detection).
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub id: String,
    /// `"video_ingest"`, `"thumbnails"` or `"sections"`.
    pub task_type: String,
    /// `pending | running | succeeded | failed | cancelled`.
    pub status: String,
    pub input_data: Option<String>,
    pub result_data: Option<String>,
    pub error_msg: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
