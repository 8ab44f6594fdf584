use crate::domain::article::Article;
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Article>>;
}

pub struct PgArticleRepository {
    pool: Arc<DbPool>,
}

impl PgArticleRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleRepository for PgArticleRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Article>> {
        let pool = self.pool.as_ref();
        let article = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, content, language, created_at
            FROM articles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(article)
    }
}
