use std::future::Future;

use chrono::Utc;
use tracing::warn;

use crate::entities::dao::TaskRecord;
use crate::entities::SqliteStore;

pub trait TaskStore: Send + Sync + 'static {
    fn insert_task(&self, task: TaskRecord)
        -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    /// Move a task to a new status, optionally attaching a result or error.
    fn update_task_status(
        &self,
        id: &str,
        status: &str,
        result_data: Option<&str>,
        error_msg: Option<&str>,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn get_task(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<TaskRecord>, sqlx::Error>> + Send;
    fn list_tasks(
        &self,
        task_type: Option<&str>,
    ) -> impl Future<Output = Result<Vec<TaskRecord>, sqlx::Error>> + Send;
}

type TaskRow = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    String,
);

impl TaskStore for SqliteStore {
    async fn insert_task(&self, task: TaskRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO tasks \
             (id, task_type, status, input_data, result_data, error_msg, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&task.id)
        .bind(&task.task_type)
        .bind(&task.status)
        .bind(&task.input_data)
        .bind(&task.result_data)
        .bind(&task.error_msg)
        .bind(task.created_at.to_rfc3339())
        .bind(task.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_task_status(
        &self,
        id: &str,
        status: &str,
        result_data: Option<&str>,
        error_msg: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE tasks SET status = ?1, result_data = ?2, error_msg = ?3, updated_at = ?4 \
             WHERE id = ?5",
        )
        .bind(status)
        .bind(result_data)
        .bind(error_msg)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_task(&self, id: &str) -> Result<Option<TaskRecord>, sqlx::Error> {
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT id, task_type, status, input_data, result_data, error_msg, \
                    created_at, updated_at \
             FROM tasks WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_task))
    }

    async fn list_tasks(&self, task_type: Option<&str>) -> Result<Vec<TaskRecord>, sqlx::Error> {
        let rows: Vec<TaskRow> = match task_type {
            Some(task_type) => {
                sqlx::query_as(
                    "SELECT id, task_type, status, input_data, result_data, error_msg, \
                            created_at, updated_at \
                     FROM tasks WHERE task_type = ?1 ORDER BY created_at DESC",
                )
                .bind(task_type)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT id, task_type, status, input_data, result_data, error_msg, \
                            created_at, updated_at \
                     FROM tasks ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.into_iter().map(row_to_task).collect())
    }
}

fn row_to_task(
    (id, task_type, status, input_data, result_data, error_msg, created_at, updated_at): TaskRow,
) -> TaskRecord {
    TaskRecord {
        id,
        task_type,
        status,
        input_data,
        result_data,
        error_msg,
        created_at: parse_or_now(&created_at),
        updated_at: parse_or_now(&updated_at),
    }
}

fn parse_or_now(raw: &str) -> chrono::DateTime<Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        warn!(raw = %raw, error = %e, "failed to parse task timestamp; using now");
        Utc::now()
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::SqliteStore;

    fn task(id: &str, task_type: &str) -> TaskRecord {
        let now = Utc::now();
        TaskRecord {
            id: id.to_string(),
            task_type: task_type.to_string(),
            status: "running".to_string(),
            input_data: None,
            result_data: None,
            error_msg: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn task_lifecycle() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.insert_task(task("t1", "thumbnails")).await.unwrap();

        let loaded = store.get_task("t1").await.unwrap().unwrap();
        assert_eq!(loaded.status, "running");

        store
            .update_task_status("t1", "succeeded", Some("{\"count\":10}"), None)
            .await
            .unwrap();
        let loaded = store.get_task("t1").await.unwrap().unwrap();
        assert_eq!(loaded.status, "succeeded");
        assert_eq!(loaded.result_data.as_deref(), Some("{\"count\":10}"));
        assert!(loaded.error_msg.is_none());
    }

    #[tokio::test]
    async fn list_tasks_filters_by_type() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.insert_task(task("t1", "thumbnails")).await.unwrap();
        store.insert_task(task("t2", "sections")).await.unwrap();

        let all = store.list_tasks(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let sections = store.list_tasks(Some("sections")).await.unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].id, "t2");
    }

    #[tokio::test]
    async fn get_missing_task_returns_none() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        assert!(store.get_task("missing").await.unwrap().is_none());
    }
}
