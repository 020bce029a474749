use chrono::{DateTime, Utc};

/// A single message row in the `chat_messages` table.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub session_id: String,
    /// `"user"` or `"bot"`.
    pub sender: String,
    pub content: String,
    /// JSON-encoded list of reasoning steps attached to bot replies;
    /// `None` for user messages.
    pub thinking_process: Option<String>,
    pub created_at: DateTime<Utc>,
}
