use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{ChatMessage, ChatSession};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateMessageRequest {
    pub content: String,
    /// When set, the reply is answered from this video's transcript.
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: String,
    pub session_id: String,
    /// `"user"` or `"bot"`.
    pub sender: String,
    pub content: String,
    /// JSON-encoded answering trace, present on bot messages.
    pub thinking_process: Option<String>,
    pub created_at: String,
}

/// Both sides of one exchange, so the client can reconcile its optimistic
/// UI with the persisted records.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageCreateResponse {
    pub message: MessageResponse,
    pub reply: MessageResponse,
}

impl ChatSession {
    pub fn to_response(&self) -> SessionResponse {
        SessionResponse {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }
}

impl ChatMessage {
    pub fn to_response(&self) -> MessageResponse {
        MessageResponse {
            id: self.id.clone(),
            session_id: self.session_id.clone(),
            sender: self.sender.clone(),
            content: self.content.clone(),
            thinking_process: self.thinking_process.clone(),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}
