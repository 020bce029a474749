use std::future::Future;

use crate::entities::dao::Section;
use crate::entities::SqliteStore;

pub trait SectionStore: Send + Sync + 'static {
    /// Replace all sections of a video in one transaction.
    fn replace_sections(
        &self,
        video_id: &str,
        sections: Vec<Section>,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn list_sections(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<Vec<Section>, sqlx::Error>> + Send;
}

impl SectionStore for SqliteStore {
    async fn replace_sections(
        &self,
        video_id: &str,
        sections: Vec<Section>,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM sections WHERE video_id = ?1")
            .bind(video_id)
            .execute(&mut *tx)
            .await?;
        for section in &sections {
            sqlx::query(
                "INSERT INTO sections (id, video_id, title, begin_time, end_time) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&section.id)
            .bind(video_id)
            .bind(&section.title)
            .bind(section.begin_time)
            .bind(section.end_time)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_sections(&self, video_id: &str) -> Result<Vec<Section>, sqlx::Error> {
        let rows: Vec<(String, String, String, f64, f64)> = sqlx::query_as(
            "SELECT id, video_id, title, begin_time, end_time \
             FROM sections WHERE video_id = ?1 ORDER BY begin_time ASC",
        )
        .bind(video_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, video_id, title, begin_time, end_time)| Section {
                id,
                video_id,
                title,
                begin_time,
                end_time,
            })
            .collect())
    }
}
