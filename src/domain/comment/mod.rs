pub mod error;
pub mod model;
pub mod service;

pub use error::CommentServiceError;
pub use model::{
    Comment, CommentPage, CommentStats, CommentSummary, Pagination, TextPreview, GENERATION_ORDER,
};
pub use service::{CommentService, CommentServiceApi};
