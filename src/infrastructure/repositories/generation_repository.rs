use crate::domain::article::GenerationRecord;
use crate::domain::voice::Speaker;
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

const RECORD_COLUMNS: &str = r#"
    id, article_id, speaker, status, audio_urls, segments_count, processing_time,
    error_message, created_at, updated_at, completed_at
"#;

/// Persistence of article generation records. Rows are never deleted.
#[async_trait]
pub trait GenerationRepository: Send + Sync {
    async fn find_completed(&self, article_id: i64, speaker: Speaker) -> AppResult<Option<GenerationRecord>>;

    async fn find_latest(&self, article_id: i64, speaker: Speaker) -> AppResult<Option<GenerationRecord>>;

    /// Create the record, or reset an existing one, in the `processing` state
    async fn begin(&self, article_id: i64, speaker: Speaker) -> AppResult<GenerationRecord>;

    async fn complete(
        &self,
        id: Uuid,
        audio_urls: &[String],
        processing_time: i32,
    ) -> AppResult<GenerationRecord>;

    async fn fail(&self, id: Uuid, error_message: &str, processing_time: i32) -> AppResult<GenerationRecord>;
}

pub struct PgGenerationRepository {
    pool: Arc<DbPool>,
}

impl PgGenerationRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenerationRepository for PgGenerationRepository {
    async fn find_completed(&self, article_id: i64, speaker: Speaker) -> AppResult<Option<GenerationRecord>> {
        let pool = self.pool.as_ref();
        let record = sqlx::query_as::<_, GenerationRecord>(&format!(
            r#"
            SELECT {}
            FROM voice_generations
            WHERE article_id = $1 AND speaker = $2 AND status = 'completed'
            "#,
            RECORD_COLUMNS
        ))
        .bind(article_id)
        .bind(speaker.as_str())
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    async fn find_latest(&self, article_id: i64, speaker: Speaker) -> AppResult<Option<GenerationRecord>> {
        let pool = self.pool.as_ref();
        let record = sqlx::query_as::<_, GenerationRecord>(&format!(
            r#"
            SELECT {}
            FROM voice_generations
            WHERE article_id = $1 AND speaker = $2
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
            RECORD_COLUMNS
        ))
        .bind(article_id)
        .bind(speaker.as_str())
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    async fn begin(&self, article_id: i64, speaker: Speaker) -> AppResult<GenerationRecord> {
        let pool = self.pool.as_ref();
        let now = chrono::Utc::now();

        let record = sqlx::query_as::<_, GenerationRecord>(&format!(
            r#"
            INSERT INTO voice_generations (id, article_id, speaker, status, audio_urls, segments_count, created_at, updated_at)
            VALUES ($1, $2, $3, 'processing', '{{}}', 0, $4, $4)
            ON CONFLICT (article_id, speaker) DO UPDATE SET
                status = 'processing',
                audio_urls = '{{}}',
                segments_count = 0,
                processing_time = NULL,
                error_message = NULL,
                completed_at = NULL,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(article_id)
        .bind(speaker.as_str())
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    async fn complete(
        &self,
        id: Uuid,
        audio_urls: &[String],
        processing_time: i32,
    ) -> AppResult<GenerationRecord> {
        let pool = self.pool.as_ref();
        let now = chrono::Utc::now();

        let record = sqlx::query_as::<_, GenerationRecord>(&format!(
            r#"
            UPDATE voice_generations
            SET status = 'completed',
                audio_urls = $2,
                segments_count = $3,
                processing_time = $4,
                completed_at = $5,
                updated_at = $5
            WHERE id = $1
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(id)
        .bind(audio_urls)
        .bind(audio_urls.len() as i32)
        .bind(processing_time)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    async fn fail(&self, id: Uuid, error_message: &str, processing_time: i32) -> AppResult<GenerationRecord> {
        let pool = self.pool.as_ref();
        let now = chrono::Utc::now();

        let record = sqlx::query_as::<_, GenerationRecord>(&format!(
            r#"
            UPDATE voice_generations
            SET status = 'failed',
                error_message = $2,
                processing_time = $3,
                updated_at = $4
            WHERE id = $1
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(id)
        .bind(error_message)
        .bind(processing_time)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }
}
