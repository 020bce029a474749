use chrono::{DateTime, Utc};

/// A row in the `chat_sessions` table.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Bumped on every message append; drives sidebar ordering.
    pub updated_at: DateTime<Utc>,
}
