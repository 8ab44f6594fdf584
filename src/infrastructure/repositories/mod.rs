pub mod article_repository;
pub mod comment_repository;
pub mod generation_repository;

pub use article_repository::{ArticleRepository, PgArticleRepository};
pub use comment_repository::{CommentRepository, PgCommentRepository};
pub use generation_repository::{GenerationRepository, PgGenerationRepository};
