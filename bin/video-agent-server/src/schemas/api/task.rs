use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::TaskRecord;

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TaskListQuery {
    /// Filter by task type (`video_ingest`, `thumbnails`, `sections`).
    pub task_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    pub id: String,
    pub task_type: String,
    pub status: String,
    pub input_data: Option<String>,
    pub result_data: Option<String>,
    pub error_msg: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TaskRecord {
    pub fn to_response(&self) -> TaskResponse {
        TaskResponse {
            id: self.id.clone(),
            task_type: self.task_type.clone(),
            status: self.status.clone(),
            input_data: self.input_data.clone(),
            result_data: self.result_data.clone(),
            error_msg: self.error_msg.clone(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }
}
