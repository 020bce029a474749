use std::future::Future;

use chrono::Utc;
use tracing::warn;

use crate::entities::dao::ChatMessage;
use crate::entities::SqliteStore;

pub trait ChatStore: Send + Sync + 'static {
    fn append_message(
        &self,
        message: ChatMessage,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    /// Messages of a session in conversation order.
    fn list_messages(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;
    /// Returns `true` when a row was actually deleted.
    fn delete_message(
        &self,
        session_id: &str,
        message_id: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

impl ChatStore for SqliteStore {
    async fn append_message(&self, message: ChatMessage) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO chat_messages \
             (id, session_id, sender, content, thinking_process, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&message.id)
        .bind(&message.session_id)
        .bind(&message.sender)
        .bind(&message.content)
        .bind(&message.thinking_process)
        .bind(message.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let rows: Vec<(String, String, String, String, Option<String>, String)> = sqlx::query_as(
            "SELECT id, session_id, sender, content, thinking_process, created_at \
             FROM chat_messages WHERE session_id = ?1 ORDER BY created_at ASC, id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(
                |(id, session_id, sender, content, thinking_process, created_at)| ChatMessage {
                    id,
                    session_id,
                    sender,
                    content,
                    thinking_process,
                    created_at: created_at.parse().unwrap_or_else(|e: chrono::ParseError| {
                        warn!(raw = %created_at, error = %e, "failed to parse message created_at; using now");
                        Utc::now()
                    }),
                },
            )
            .collect())
    }

    async fn delete_message(
        &self,
        session_id: &str,
        message_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE id = ?1 AND session_id = ?2")
            .bind(message_id)
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::dao::ChatSession;
    use crate::entities::{SessionStore, SqliteStore};
    use chrono::{Duration, Utc};

    async fn store_with_session(id: &str) -> SqliteStore {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        let now = Utc::now();
        store
            .create_session(ChatSession {
                id: id.to_string(),
                title: "New chat".to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        store
    }

    fn message(id: &str, session_id: &str, sender: &str, offset_sec: i64) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            session_id: session_id.to_string(),
            sender: sender.to_string(),
            content: format!("message {id}"),
            thinking_process: None,
            created_at: Utc::now() + Duration::seconds(offset_sec),
        }
    }

    #[tokio::test]
    async fn messages_come_back_in_conversation_order() {
        let store = store_with_session("s1").await;
        store.append_message(message("m2", "s1", "bot", 10)).await.unwrap();
        store.append_message(message("m1", "s1", "user", 0)).await.unwrap();

        let listed = store.list_messages("s1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "m1");
        assert_eq!(listed[1].id, "m2");
    }

    #[tokio::test]
    async fn delete_message_is_scoped_to_the_session() {
        let store = store_with_session("s1").await;
        store.append_message(message("m1", "s1", "user", 0)).await.unwrap();

        assert!(!store.delete_message("other", "m1").await.unwrap());
        assert!(store.delete_message("s1", "m1").await.unwrap());
        assert!(store.list_messages("s1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_session_cascades_to_messages() {
        let store = store_with_session("s1").await;
        store.append_message(message("m1", "s1", "user", 0)).await.unwrap();

        assert!(store.delete_session("s1").await.unwrap());
        assert!(store.list_messages("s1").await.unwrap().is_empty());
    }
}
