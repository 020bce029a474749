/// A row in the `sections` table – a contiguous segment of a video,
/// typically one slide of a lecture recording.
#[derive(Debug, Clone)]
pub struct Section {
    pub id: String,
    pub video_id: String,
    pub title: String,
    /// Start time in seconds.
    pub begin_time: f64,
    /// End time in seconds.
    pub end_time: f64,
}
