/// A row in the `video_transcripts` table – one ASR transcript per video.
#[derive(Debug, Clone)]
pub struct VideoTranscript {
    pub video_id: String,
    /// URL of the audio file the ASR service consumed.
    pub file_url: String,
    /// Audio format, e.g. `"pcm_s16le"`.
    pub format: String,
    /// Sample rate in Hz, e.g. `16000`.
    pub sample_rate: i64,
}

/// A row in the `transcript_sentences` table.
#[derive(Debug, Clone)]
pub struct TranscriptSentence {
    pub id: String,
    pub video_id: String,
    pub channel_id: i64,
    pub sentence_id: i64,
    /// Start time in milliseconds.
    pub begin_time: i64,
    /// End time in milliseconds.
    pub end_time: i64,
    pub language: String,
    pub emotion: String,
    pub text: String,
}
