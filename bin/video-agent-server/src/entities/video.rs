use std::future::Future;

use chrono::Utc;
use tracing::warn;

use crate::entities::dao::{Thumbnail, Video};
use crate::entities::SqliteStore;

pub trait VideoStore: Send + Sync + 'static {
    fn insert_video(&self, video: Video) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn get_video(&self, id: &str)
        -> impl Future<Output = Result<Option<Video>, sqlx::Error>> + Send;
    fn list_videos(&self) -> impl Future<Output = Result<Vec<Video>, sqlx::Error>> + Send;
    fn update_video_duration(
        &self,
        id: &str,
        duration: f64,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    /// Returns `true` when a row was actually deleted.
    fn delete_video(&self, id: &str) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

pub trait ThumbnailStore: Send + Sync + 'static {
    /// Replace all thumbnails of a video in one transaction.
    fn replace_thumbnails(
        &self,
        video_id: &str,
        thumbnails: Vec<Thumbnail>,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn list_thumbnails(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<Vec<Thumbnail>, sqlx::Error>> + Send;
}

impl VideoStore for SqliteStore {
    async fn insert_video(&self, video: Video) -> Result<(), sqlx::Error> {
        let created_at = video.created_at.to_rfc3339();
        sqlx::query(
            "INSERT INTO videos (id, title, file_path, duration, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&video.id)
        .bind(&video.title)
        .bind(&video.file_path)
        .bind(video.duration)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_video(&self, id: &str) -> Result<Option<Video>, sqlx::Error> {
        let row: Option<(String, String, String, f64, String)> = sqlx::query_as(
            "SELECT id, title, file_path, duration, created_at FROM videos WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_video))
    }

    async fn list_videos(&self) -> Result<Vec<Video>, sqlx::Error> {
        let rows: Vec<(String, String, String, f64, String)> = sqlx::query_as(
            "SELECT id, title, file_path, duration, created_at \
             FROM videos ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_video).collect())
    }

    async fn update_video_duration(&self, id: &str, duration: f64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE videos SET duration = ?1 WHERE id = ?2")
            .bind(duration)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_video(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM videos WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl ThumbnailStore for SqliteStore {
    async fn replace_thumbnails(
        &self,
        video_id: &str,
        thumbnails: Vec<Thumbnail>,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM thumbnails WHERE video_id = ?1")
            .bind(video_id)
            .execute(&mut *tx)
            .await?;
        for thumb in &thumbnails {
            sqlx::query(
                "INSERT INTO thumbnails (id, video_id, time_second, image_path) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&thumb.id)
            .bind(video_id)
            .bind(thumb.time_second)
            .bind(&thumb.image_path)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_thumbnails(&self, video_id: &str) -> Result<Vec<Thumbnail>, sqlx::Error> {
        let rows: Vec<(String, String, f64, String)> = sqlx::query_as(
            "SELECT id, video_id, time_second, image_path \
             FROM thumbnails WHERE video_id = ?1 ORDER BY time_second ASC",
        )
        .bind(video_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, video_id, time_second, image_path)| Thumbnail {
                id,
                video_id,
                time_second,
                image_path,
            })
            .collect())
    }
}

fn row_to_video(
    (id, title, file_path, duration, created_at): (String, String, String, f64, String),
) -> Video {
    Video {
        id,
        title,
        file_path,
        duration,
        created_at: created_at.parse().unwrap_or_else(|e: chrono::ParseError| {
            warn!(raw = %created_at, error = %e, "failed to parse video created_at; using now");
            Utc::now()
        }),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::SqliteStore;

    fn video(id: &str, title: &str) -> Video {
        Video {
            id: id.to_string(),
            title: title.to_string(),
            file_path: format!("videos/{id}.mp4"),
            duration: 120.0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_video() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.insert_video(video("v1", "Lecture 1")).await.unwrap();

        let loaded = store.get_video("v1").await.unwrap().unwrap();
        assert_eq!(loaded.title, "Lecture 1");
        assert_eq!(loaded.file_path, "videos/v1.mp4");
        assert!(store.get_video("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_video_reports_whether_row_existed() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.insert_video(video("v1", "Lecture 1")).await.unwrap();

        assert!(store.delete_video("v1").await.unwrap());
        assert!(!store.delete_video("v1").await.unwrap());
    }

    #[tokio::test]
    async fn update_duration_persists() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        let mut v = video("v1", "Lecture 1");
        v.duration = 0.0;
        store.insert_video(v).await.unwrap();

        store.update_video_duration("v1", 631.5).await.unwrap();
        let loaded = store.get_video("v1").await.unwrap().unwrap();
        assert_eq!(loaded.duration, 631.5);
    }

    #[tokio::test]
    async fn replace_thumbnails_swaps_the_whole_set() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.insert_video(video("v1", "Lecture 1")).await.unwrap();

        let thumb = |id: &str, ts: f64| Thumbnail {
            id: id.to_string(),
            video_id: "v1".to_string(),
            time_second: ts,
            image_path: format!("thumbnails/{id}.jpg"),
        };

        store
            .replace_thumbnails("v1", vec![thumb("t1", 30.0), thumb("t2", 10.0)])
            .await
            .unwrap();
        let listed = store.list_thumbnails("v1").await.unwrap();
        assert_eq!(listed.len(), 2);
        // Ordered by time_second, not insertion order.
        assert_eq!(listed[0].id, "t2");

        store
            .replace_thumbnails("v1", vec![thumb("t3", 5.0)])
            .await
            .unwrap();
        let listed = store.list_thumbnails("v1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "t3");
    }

    #[tokio::test]
    async fn deleting_video_cascades_to_thumbnails() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.insert_video(video("v1", "Lecture 1")).await.unwrap();
        store
            .replace_thumbnails(
                "v1",
                vec![Thumbnail {
                    id: "t1".to_string(),
                    video_id: "v1".to_string(),
                    time_second: 10.0,
                    image_path: "thumbnails/t1.jpg".to_string(),
                }],
            )
            .await
            .unwrap();

        store.delete_video("v1").await.unwrap();
        assert!(store.list_thumbnails("v1").await.unwrap().is_empty());
    }
}
