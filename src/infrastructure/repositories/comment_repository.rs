use crate::domain::comment::Comment;
use crate::error::AppResult;
use crate::infrastructure::db::{check_connection, DbPool};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

const COMMENT_COLUMNS: &str = r#"
    id, gmail, github_repo_url, created_at,
    comment_en_ng, comment_en_paul, comment_en_li, comment_en_sam,
    comment_cn_ng, comment_cn_paul, comment_cn_li, comment_cn_sam
"#;

/// Read access to judge comments. This service never writes them.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Comment>>;

    /// Newest first, with the total row count
    async fn list_recent(&self, limit: i64, offset: i64) -> AppResult<(Vec<Comment>, i64)>;

    /// Case-insensitive match over email, repository url and the English comments
    async fn search(&self, query: &str, limit: i64, offset: i64) -> AppResult<(Vec<Comment>, i64)>;

    async fn ping(&self) -> AppResult<()>;
}

pub struct PgCommentRepository {
    pool: Arc<DbPool>,
}

impl PgCommentRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Comment>> {
        let pool = self.pool.as_ref();
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM judge_comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    async fn list_recent(&self, limit: i64, offset: i64) -> AppResult<(Vec<Comment>, i64)> {
        let pool = self.pool.as_ref();
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM judge_comments ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            COMMENT_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM judge_comments")
            .fetch_one(pool)
            .await?;

        Ok((comments, total))
    }

    async fn search(&self, query: &str, limit: i64, offset: i64) -> AppResult<(Vec<Comment>, i64)> {
        let pool = self.pool.as_ref();
        let pattern = format!("%{}%", query);
        let filter = r#"
            gmail ILIKE $1
            OR github_repo_url ILIKE $1
            OR comment_en_ng ILIKE $1
            OR comment_en_paul ILIKE $1
            OR comment_en_li ILIKE $1
            OR comment_en_sam ILIKE $1
        "#;

        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM judge_comments WHERE {} ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            COMMENT_COLUMNS, filter
        ))
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM judge_comments WHERE {}",
            filter
        ))
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

        Ok((comments, total))
    }

    async fn ping(&self) -> AppResult<()> {
        check_connection(&self.pool).await?;
        Ok(())
    }
}
