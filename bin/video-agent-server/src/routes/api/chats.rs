//! Chat session routes.
//!
//! Posting a message persists the user's message, generates a bot reply
//! (answered from a video transcript when `video_id` is given), persists
//! the reply, and returns both records in one response.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::answer;
use crate::entities::{ChatMessage, ChatSession, ChatStore, SessionStore, TranscriptStore};
use crate::error::ServerError;
use crate::routes::api::videos::require_video;
use crate::schemas::api::chat::{
    CreateMessageRequest, CreateSessionRequest, MessageCreateResponse, MessageResponse,
    SessionResponse,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_session,
        list_sessions,
        delete_session,
        list_session_messages,
        create_message,
        delete_message
    ),
    components(schemas(
        CreateSessionRequest,
        SessionResponse,
        CreateMessageRequest,
        MessageResponse,
        MessageCreateResponse
    ))
)]
pub struct ChatsApi;

/// Reply used when a question arrives without a video to answer from.
const NO_VIDEO_REPLY: &str =
    "Please select a video so I can answer from its transcript. \
     Include a video_id with your question.";

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chats", post(create_session).get(list_sessions))
        .route("/chats/{id}", delete(delete_session))
        .route(
            "/chats/{id}/messages",
            get(list_session_messages).post(create_message),
        )
        .route(
            "/chats/{id}/messages/{message_id}",
            delete(delete_message),
        )
}

// ── Session handlers ──────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/api/chats",
    tag = "chats",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Session created", body = SessionResponse),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<SessionResponse>, ServerError> {
    let now = Utc::now();
    let session = ChatSession {
        id: Uuid::new_v4().to_string(),
        title: req.title.unwrap_or_else(|| "New chat".to_string()),
        created_at: now,
        updated_at: now,
    };
    state.store.create_session(session.clone()).await?;
    Ok(Json(session.to_response()))
}

#[utoipa::path(
    get,
    path = "/api/chats",
    tag = "chats",
    responses(
        (status = 200, description = "Session list retrieved", body = Vec<SessionResponse>),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SessionResponse>>, ServerError> {
    let sessions = state.store.list_sessions().await?;
    Ok(Json(sessions.iter().map(|s| s.to_response()).collect()))
}

/// Delete a chat session. Idempotent: deleting a missing session is still
/// a 200.
#[utoipa::path(
    delete,
    path = "/api/chats/{id}",
    tag = "chats",
    responses(
        (status = 200, description = "Session deleted", body = serde_json::Value),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let deleted = state.store.delete_session(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

// ── Message handlers ──────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/chats/{id}/messages",
    tag = "chats",
    responses(
        (status = 200, description = "Session messages retrieved", body = Vec<MessageResponse>),
        (status = 404, description = "Session not found"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn list_session_messages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, ServerError> {
    require_session(&state, &id).await?;
    let messages = state.store.list_messages(&id).await?;
    Ok(Json(messages.iter().map(|m| m.to_response()).collect()))
}

#[utoipa::path(
    post,
    path = "/api/chats/{id}/messages",
    tag = "chats",
    request_body = CreateMessageRequest,
    responses(
        (status = 200, description = "Message stored and answered", body = MessageCreateResponse),
        (status = 400, description = "Empty message content"),
        (status = 404, description = "Session or video not found"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<Json<MessageCreateResponse>, ServerError> {
    require_session(&state, &id).await?;
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ServerError::BadRequest("Message content is empty".into()));
    }

    // Resolve the video before writing anything; a rejected request must
    // not leave a half-written conversation behind.
    let sentences = match &req.video_id {
        Some(video_id) => {
            require_video(&state, video_id).await?;
            Some(state.store.list_sentences(video_id).await?)
        }
        None => None,
    };

    let message = ChatMessage {
        id: Uuid::new_v4().to_string(),
        session_id: id.clone(),
        sender: "user".to_string(),
        content: content.to_string(),
        thinking_process: None,
        created_at: Utc::now(),
    };
    state.store.append_message(message.clone()).await?;

    let (reply_content, thinking_process) = match sentences {
        Some(sentences) => {
            let result = answer::answer_query(&sentences, content);
            let trace = serde_json::to_string(&result.steps)
                .map_err(|e| ServerError::Internal(format!("failed to encode trace: {e}")))?;
            (result.answer, Some(trace))
        }
        None => (NO_VIDEO_REPLY.to_string(), None),
    };

    let reply = ChatMessage {
        id: Uuid::new_v4().to_string(),
        session_id: id.clone(),
        sender: "bot".to_string(),
        content: reply_content,
        thinking_process,
        created_at: Utc::now(),
    };
    state.store.append_message(reply.clone()).await?;
    state.store.touch_session(&id).await?;

    Ok(Json(MessageCreateResponse {
        message: message.to_response(),
        reply: reply.to_response(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/chats/{id}/messages/{message_id}",
    tag = "chats",
    responses(
        (status = 200, description = "Message deleted", body = serde_json::Value),
        (status = 404, description = "Session or message not found"),
        (status = 500, description = "Backend error"),
    )
)]
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    Path((id, message_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ServerError> {
    require_session(&state, &id).await?;
    if !state.store.delete_message(&id, &message_id).await? {
        return Err(ServerError::NotFound(format!(
            "Message not found: {message_id}"
        )));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

async fn require_session(state: &AppState, id: &str) -> Result<ChatSession, ServerError> {
    state
        .store
        .get_session(id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Chat session not found: {id}")))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::entities::{SqliteStore, TranscriptSentence, Video, VideoStore, VideoTranscript};
    use crate::state::TaskManager;

    async fn test_state() -> Arc<AppState> {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        Arc::new(AppState {
            config: Arc::new(Config::from_env()),
            store: Arc::new(store),
            task_manager: Arc::new(TaskManager::new()),
        })
    }

    async fn new_session(state: &Arc<AppState>) -> String {
        let Json(session) = create_session(
            State(state.clone()),
            Json(CreateSessionRequest { title: None }),
        )
        .await
        .unwrap();
        session.id
    }

    async fn seed_video_with_transcript(state: &Arc<AppState>, video_id: &str) {
        state
            .store
            .insert_video(Video {
                id: video_id.to_string(),
                title: "Lecture".to_string(),
                file_path: format!("videos/{video_id}.mp4"),
                duration: 60.0,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        state
            .store
            .upsert_transcript(VideoTranscript {
                video_id: video_id.to_string(),
                file_url: format!("https://example.com/{video_id}.wav"),
                format: "wav".to_string(),
                sample_rate: 16000,
            })
            .await
            .unwrap();
        state
            .store
            .replace_channel_sentences(
                video_id,
                0,
                vec![TranscriptSentence {
                    id: "s1".to_string(),
                    video_id: video_id.to_string(),
                    channel_id: 0,
                    sentence_id: 1,
                    begin_time: 4000,
                    end_time: 9000,
                    language: "en".to_string(),
                    emotion: "neutral".to_string(),
                    text: "The training loss decreases over time.".to_string(),
                }],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn posting_without_a_video_returns_the_guidance_reply() {
        let state = test_state().await;
        let session_id = new_session(&state).await;

        let Json(exchange) = create_message(
            State(state.clone()),
            Path(session_id.clone()),
            Json(CreateMessageRequest {
                content: "What is covered here?".to_string(),
                video_id: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(exchange.message.sender, "user");
        assert_eq!(exchange.message.content, "What is covered here?");
        assert_eq!(exchange.reply.sender, "bot");
        assert_eq!(exchange.reply.content, NO_VIDEO_REPLY);
        assert!(exchange.reply.thinking_process.is_none());
        assert_eq!(state.store.list_messages(&session_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn posting_with_a_video_answers_from_its_transcript() {
        let state = test_state().await;
        let session_id = new_session(&state).await;
        seed_video_with_transcript(&state, "v1").await;

        let Json(exchange) = create_message(
            State(state.clone()),
            Path(session_id.clone()),
            Json(CreateMessageRequest {
                content: "How does the training loss change?".to_string(),
                video_id: Some("v1".to_string()),
            }),
        )
        .await
        .unwrap();

        assert!(exchange.reply.content.contains("training loss"));
        assert!(exchange.reply.thinking_process.is_some());

        // The exchange bumps the session so it sorts to the top.
        let session = state.store.get_session(&session_id).await.unwrap().unwrap();
        assert!(session.updated_at > session.created_at);
    }

    #[tokio::test]
    async fn empty_content_is_rejected_before_anything_is_stored() {
        let state = test_state().await;
        let session_id = new_session(&state).await;

        let result = create_message(
            State(state.clone()),
            Path(session_id.clone()),
            Json(CreateMessageRequest {
                content: "   ".to_string(),
                video_id: None,
            }),
        )
        .await;

        assert!(matches!(result, Err(ServerError::BadRequest(_))));
        assert!(state.store.list_messages(&session_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_video_leaves_the_session_untouched() {
        let state = test_state().await;
        let session_id = new_session(&state).await;

        let result = create_message(
            State(state.clone()),
            Path(session_id.clone()),
            Json(CreateMessageRequest {
                content: "Summarize the lecture".to_string(),
                video_id: Some("missing".to_string()),
            }),
        )
        .await;

        assert!(matches!(result, Err(ServerError::NotFound(_))));
        assert!(state.store.list_messages(&session_id).await.unwrap().is_empty());
    }
}
