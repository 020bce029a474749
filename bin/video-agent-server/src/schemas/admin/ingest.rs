use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Speech-recognition result document as produced by the transcription
/// pipeline. Unknown fields are ignored; missing fields fall back to
/// defaults so partial documents still import.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AsrResultDocument {
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub audio_info: AsrAudioInfo,
    #[serde(default)]
    pub transcripts: Vec<AsrChannelTranscript>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AsrAudioInfo {
    #[serde(default)]
    pub format: String,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: i64,
}

fn default_sample_rate() -> i64 {
    16000
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AsrChannelTranscript {
    #[serde(default)]
    pub channel_id: i64,
    #[serde(default)]
    pub sentences: Vec<AsrSentence>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AsrSentence {
    #[serde(default)]
    pub sentence_id: i64,
    /// Milliseconds from the start of the audio.
    #[serde(default)]
    pub begin_time: i64,
    #[serde(default)]
    pub end_time: i64,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub emotion: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RebuildThumbnailsRequest {
    /// Explicit capture timestamps in seconds; evenly spaced when omitted.
    pub timestamps: Option<Vec<f64>>,
    /// Output width in pixels; server default when omitted.
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RebuildSectionsRequest {
    /// Frames at least this similar (0..1) are treated as the same slide.
    /// `ssim_threshold` is accepted as a legacy alias.
    #[serde(alias = "ssim_threshold")]
    pub similarity_threshold: Option<f64>,
    /// Minimum seconds between two detected slide changes.
    pub min_interval_sec: Option<f64>,
}

/// Returned with HTTP 202 when a background job was accepted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskAcceptedResponse {
    pub task_id: String,
}
