use std::future::Future;

use chrono::Utc;
use tracing::warn;

use crate::entities::dao::ChatSession;
use crate::entities::SqliteStore;

pub trait SessionStore: Send + Sync + 'static {
    fn create_session(
        &self,
        session: ChatSession,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn get_session(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<ChatSession>, sqlx::Error>> + Send;
    /// Most recently active sessions first.
    fn list_sessions(&self) -> impl Future<Output = Result<Vec<ChatSession>, sqlx::Error>> + Send;
    /// Bump `updated_at` so the session sorts to the top of the list.
    fn touch_session(&self, id: &str) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    /// Returns `true` when a row was actually deleted.
    fn delete_session(&self, id: &str) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

impl SessionStore for SqliteStore {
    async fn create_session(&self, session: ChatSession) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO chat_sessions (id, title, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&session.id)
        .bind(&session.title)
        .bind(session.created_at.to_rfc3339())
        .bind(session.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<ChatSession>, sqlx::Error> {
        let row: Option<(String, String, String, String)> = sqlx::query_as(
            "SELECT id, title, created_at, updated_at FROM chat_sessions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_session))
    }

    async fn list_sessions(&self) -> Result<Vec<ChatSession>, sqlx::Error> {
        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            "SELECT id, title, created_at, updated_at \
             FROM chat_sessions ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_session).collect())
    }

    async fn touch_session(&self, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE chat_sessions SET updated_at = ?1 WHERE id = ?2")
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_session(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_session((id, title, created_at, updated_at): (String, String, String, String)) -> ChatSession {
    ChatSession {
        id,
        title,
        created_at: parse_or_now(&created_at),
        updated_at: parse_or_now(&updated_at),
    }
}

fn parse_or_now(raw: &str) -> chrono::DateTime<Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        warn!(raw = %raw, error = %e, "failed to parse session timestamp; using now");
        Utc::now()
    })
}
