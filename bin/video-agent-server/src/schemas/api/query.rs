use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::answer::ThinkingStep;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryRequest {
    pub video_id: String,
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryResponse {
    pub video_id: String,
    pub query: String,
    pub answer: String,
    /// Seconds into the video where the answer was found, ascending.
    pub timestamps: Vec<f64>,
    pub steps: Vec<ThinkingStep>,
}
