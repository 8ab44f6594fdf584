use super::error::CommentServiceError;
use super::model::{Comment, CommentPage, CommentStats, CommentSummary, Pagination, GENERATION_ORDER};
use crate::domain::voice::{AudioCache, AudioKey, Language, SubjectId};
use crate::infrastructure::repositories::CommentRepository;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

pub struct CommentService {
    comment_repo: Arc<dyn CommentRepository>,
    cache: AudioCache,
}

impl CommentService {
    pub fn new(comment_repo: Arc<dyn CommentRepository>, cache: AudioCache) -> Self {
        Self { comment_repo, cache }
    }
}

#[async_trait]
pub trait CommentServiceApi: Send + Sync {
    /// Page through comments, newest first, optionally filtered by a search term
    async fn list_comments(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
        search: Option<String>,
    ) -> Result<CommentPage, CommentServiceError>;

    async fn get_comment(&self, comment_id: Uuid) -> Result<Comment, CommentServiceError>;

    async fn comment_stats(&self, comment_id: Uuid) -> Result<(Comment, CommentStats), CommentServiceError>;
}

#[async_trait]
impl CommentServiceApi for CommentService {
    async fn list_comments(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
        search: Option<String>,
    ) -> Result<CommentPage, CommentServiceError> {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| CommentServiceError::Invalid(format!("page out of range: {}", page)))?;
        let query = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let (comments, total) = match &query {
            Some(query) => self.comment_repo.search(query, limit, offset).await,
            None => self.comment_repo.list_recent(limit, offset).await,
        }
        .map_err(|e| CommentServiceError::Dependency(e.to_string()))?;

        tracing::debug!(
            page = page,
            limit = limit,
            total = total,
            search = query.as_deref().unwrap_or(""),
            "Comments listed"
        );

        Ok(CommentPage {
            data: comments.iter().map(|c| self.summarize(c)).collect(),
            pagination: Pagination::new(page, limit, total, query),
        })
    }

    async fn get_comment(&self, comment_id: Uuid) -> Result<Comment, CommentServiceError> {
        self.comment_repo
            .find_by_id(comment_id)
            .await
            .map_err(|e| CommentServiceError::Dependency(e.to_string()))?
            .ok_or(CommentServiceError::NotFound)
    }

    async fn comment_stats(&self, comment_id: Uuid) -> Result<(Comment, CommentStats), CommentServiceError> {
        let comment = self.get_comment(comment_id).await?;
        let stats = CommentStats::from(&comment);
        Ok((comment, stats))
    }
}

impl CommentService {
    fn summarize(&self, comment: &Comment) -> CommentSummary {
        let subject = SubjectId::from(comment.id);
        let has_audio = GENERATION_ORDER
            .into_iter()
            .map(|speaker| {
                let key = AudioKey::new(subject.clone(), speaker, Language::English);
                (speaker, self.cache.has(&key))
            })
            .collect();

        CommentSummary {
            id: comment.id,
            gmail: comment.gmail.clone(),
            github_repo_url: comment.github_repo_url.clone(),
            created_at: comment.created_at,
            has_audio,
            text_previews: comment.previews(Language::English),
        }
    }
}
