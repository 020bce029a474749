use std::future::Future;

use crate::entities::dao::{TranscriptSentence, VideoTranscript};
use crate::entities::SqliteStore;

pub trait TranscriptStore: Send + Sync + 'static {
    /// Create or update the transcript header row for a video.
    fn upsert_transcript(
        &self,
        transcript: VideoTranscript,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn get_transcript(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<Option<VideoTranscript>, sqlx::Error>> + Send;
    /// Replace all sentences of one audio channel in one transaction.
    fn replace_channel_sentences(
        &self,
        video_id: &str,
        channel_id: i64,
        sentences: Vec<TranscriptSentence>,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    /// All sentences of a video across channels, ordered by begin time.
    fn list_sentences(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<Vec<TranscriptSentence>, sqlx::Error>> + Send;
}

impl TranscriptStore for SqliteStore {
    async fn upsert_transcript(&self, transcript: VideoTranscript) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO video_transcripts (video_id, file_url, format, sample_rate) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(video_id) DO UPDATE SET file_url = ?2, format = ?3, sample_rate = ?4",
        )
        .bind(&transcript.video_id)
        .bind(&transcript.file_url)
        .bind(&transcript.format)
        .bind(transcript.sample_rate)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_transcript(&self, video_id: &str) -> Result<Option<VideoTranscript>, sqlx::Error> {
        let row: Option<(String, String, String, i64)> = sqlx::query_as(
            "SELECT video_id, file_url, format, sample_rate \
             FROM video_transcripts WHERE video_id = ?1",
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(video_id, file_url, format, sample_rate)| VideoTranscript {
            video_id,
            file_url,
            format,
            sample_rate,
        }))
    }

    async fn replace_channel_sentences(
        &self,
        video_id: &str,
        channel_id: i64,
        sentences: Vec<TranscriptSentence>,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM transcript_sentences WHERE video_id = ?1 AND channel_id = ?2")
            .bind(video_id)
            .bind(channel_id)
            .execute(&mut *tx)
            .await?;
        for s in &sentences {
            sqlx::query(
                "INSERT INTO transcript_sentences \
                 (id, video_id, channel_id, sentence_id, begin_time, end_time, language, emotion, text) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )
            .bind(&s.id)
            .bind(video_id)
            .bind(channel_id)
            .bind(s.sentence_id)
            .bind(s.begin_time)
            .bind(s.end_time)
            .bind(&s.language)
            .bind(&s.emotion)
            .bind(&s.text)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_sentences(&self, video_id: &str) -> Result<Vec<TranscriptSentence>, sqlx::Error> {
        let rows: Vec<(String, String, i64, i64, i64, i64, String, String, String)> =
            sqlx::query_as(
                "SELECT id, video_id, channel_id, sentence_id, begin_time, end_time, \
                        language, emotion, text \
                 FROM transcript_sentences WHERE video_id = ?1 \
                 ORDER BY channel_id ASC, begin_time ASC",
            )
            .bind(video_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(
                |(id, video_id, channel_id, sentence_id, begin_time, end_time, language, emotion, text)| {
                    TranscriptSentence {
                        id,
                        video_id,
                        channel_id,
                        sentence_id,
                        begin_time,
                        end_time,
                        language,
                        emotion,
                        text,
                    }
                },
            )
            .collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::dao::Video;
    use crate::entities::{SqliteStore, VideoStore};
    use chrono::Utc;

    async fn store_with_video(id: &str) -> SqliteStore {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store
            .insert_video(Video {
                id: id.to_string(),
                title: "Lecture".to_string(),
                file_path: format!("videos/{id}.mp4"),
                duration: 120.0,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        store
    }

    fn transcript(video_id: &str, format: &str) -> VideoTranscript {
        VideoTranscript {
            video_id: video_id.to_string(),
            file_url: "https://example.com/audio.wav".to_string(),
            format: format.to_string(),
            sample_rate: 16000,
        }
    }

    fn sentence(video_id: &str, channel_id: i64, sentence_id: i64, text: &str) -> TranscriptSentence {
        TranscriptSentence {
            id: format!("{video_id}-{channel_id}-{sentence_id}"),
            video_id: video_id.to_string(),
            channel_id,
            sentence_id,
            begin_time: sentence_id * 1000,
            end_time: (sentence_id + 1) * 1000,
            language: "en".to_string(),
            emotion: "neutral".to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_transcript_overwrites_existing_row() {
        let store = store_with_video("v1").await;

        store.upsert_transcript(transcript("v1", "wav")).await.unwrap();
        store.upsert_transcript(transcript("v1", "pcm")).await.unwrap();

        let loaded = store.get_transcript("v1").await.unwrap().unwrap();
        assert_eq!(loaded.format, "pcm");
    }

    #[tokio::test]
    async fn missing_transcript_is_none() {
        let store = store_with_video("v1").await;
        assert!(store.get_transcript("v1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_sentences_only_touches_the_given_channel() {
        let store = store_with_video("v1").await;
        store.upsert_transcript(transcript("v1", "wav")).await.unwrap();

        store
            .replace_channel_sentences("v1", 0, vec![sentence("v1", 0, 1, "channel zero")])
            .await
            .unwrap();
        store
            .replace_channel_sentences("v1", 1, vec![sentence("v1", 1, 1, "channel one")])
            .await
            .unwrap();

        // Replacing channel 0 must leave channel 1 intact.
        store
            .replace_channel_sentences("v1", 0, vec![sentence("v1", 0, 2, "channel zero again")])
            .await
            .unwrap();

        let all = store.list_sentences("v1").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].text, "channel zero again");
        assert_eq!(all[1].text, "channel one");
    }

    #[tokio::test]
    async fn sentences_are_ordered_by_begin_time() {
        let store = store_with_video("v1").await;
        store.upsert_transcript(transcript("v1", "wav")).await.unwrap();
        store
            .replace_channel_sentences(
                "v1",
                0,
                vec![
                    sentence("v1", 0, 5, "later"),
                    sentence("v1", 0, 1, "earlier"),
                ],
            )
            .await
            .unwrap();

        let all = store.list_sentences("v1").await.unwrap();
        assert_eq!(all[0].text, "earlier");
        assert_eq!(all[1].text, "later");
    }
}
