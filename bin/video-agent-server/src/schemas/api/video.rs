use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{Section, Thumbnail, TranscriptSentence, Video, VideoTranscript};
use crate::schemas::media_url;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ThumbnailResponse {
    pub id: String,
    pub time_second: f64,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: String,
    pub title: String,
    pub video_url: String,
    pub duration: f64,
    pub created_at: String,
    pub thumbnails: Vec<ThumbnailResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadVideoResponse {
    pub video: VideoResponse,
    /// ID of the background ingest task (thumbnails + sections).
    pub task_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TranscriptSentenceResponse {
    pub channel_id: i64,
    pub sentence_id: i64,
    /// Milliseconds from the start of the video.
    pub begin_time: i64,
    pub end_time: i64,
    pub language: String,
    pub emotion: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TranscriptResponse {
    pub video_id: String,
    pub file_url: String,
    pub format: String,
    pub sample_rate: i64,
    pub sentences: Vec<TranscriptSentenceResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SectionResponse {
    pub id: String,
    pub title: String,
    pub begin_time: f64,
    pub end_time: f64,
}

impl Video {
    pub fn to_response(&self, thumbnails: Vec<ThumbnailResponse>) -> VideoResponse {
        VideoResponse {
            id: self.id.clone(),
            title: self.title.clone(),
            video_url: media_url(&self.file_path),
            duration: self.duration,
            created_at: self.created_at.to_rfc3339(),
            thumbnails,
        }
    }
}

impl Thumbnail {
    pub fn to_response(&self) -> ThumbnailResponse {
        ThumbnailResponse {
            id: self.id.clone(),
            time_second: self.time_second,
            image_url: media_url(&self.image_path),
        }
    }
}

impl TranscriptSentence {
    pub fn to_response(&self) -> TranscriptSentenceResponse {
        TranscriptSentenceResponse {
            channel_id: self.channel_id,
            sentence_id: self.sentence_id,
            begin_time: self.begin_time,
            end_time: self.end_time,
            language: self.language.clone(),
            emotion: self.emotion.clone(),
            text: self.text.clone(),
        }
    }
}

impl VideoTranscript {
    pub fn to_response(&self, sentences: Vec<TranscriptSentenceResponse>) -> TranscriptResponse {
        TranscriptResponse {
            video_id: self.video_id.clone(),
            file_url: self.file_url.clone(),
            format: self.format.clone(),
            sample_rate: self.sample_rate,
            sentences,
        }
    }
}

impl Section {
    pub fn to_response(&self) -> SectionResponse {
        SectionResponse {
            id: self.id.clone(),
            title: self.title.clone(),
            begin_time: self.begin_time,
            end_time: self.end_time,
        }
    }
}
