use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::controllers::{
    articles::ArticleController, comments::CommentController, health::HealthController, not_found,
    tts::TtsController,
};
use crate::infrastructure::config::Config;
use crate::infrastructure::middleware::request_id_middleware;

/// Controllers wired into the router
#[derive(Clone)]
pub struct AppControllers {
    pub health: Arc<HealthController>,
    pub tts: Arc<TtsController>,
    pub comments: Arc<CommentController>,
    pub articles: Arc<ArticleController>,
}

/// Build the full application router
pub fn build_router(controllers: AppControllers, allowed_origin: Option<&str>) -> Router {
    let health_routes = Router::new()
        .route("/", get(HealthController::info))
        .route("/health", get(HealthController::health))
        .route("/health/ready", get(HealthController::health_ready))
        .with_state(controllers.health);

    let tts_routes = Router::new()
        .route("/api/tts", post(TtsController::synthesize))
        .route("/api/tts/speakers", get(TtsController::speakers))
        .route("/api/tts/:speaker", post(TtsController::synthesize_for_speaker))
        .with_state(controllers.tts);

    let comment_routes = Router::new()
        .route("/api/comments", get(CommentController::list_comments))
        .route("/api/comments/cache", delete(CommentController::clear_all_cache))
        .route("/api/comments/cache/stats", get(CommentController::cache_stats))
        .route("/api/comments/cache/warmup", post(CommentController::warmup))
        .route("/api/comments/:id", get(CommentController::get_comment))
        .route("/api/comments/:id/audio", get(CommentController::list_audio))
        .route("/api/comments/:id/audio/:speaker", get(CommentController::speaker_audio))
        .route("/api/comments/:id/generate-all", post(CommentController::generate_all))
        .route("/api/comments/:id/cache", delete(CommentController::clear_comment_cache))
        .with_state(controllers.comments);

    let article_routes = Router::new()
        .route("/api/articles/:id/voice", post(ArticleController::generate_voice))
        .route("/api/articles/:id/voice/:speaker", get(ArticleController::voice_status))
        .with_state(controllers.articles);

    Router::new()
        .merge(health_routes)
        .merge(tts_routes)
        .merge(comment_routes)
        .merge(article_routes)
        .fallback(not_found)
        .layer(cors_layer(allowed_origin))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Any origin unless a comma-separated allow list is configured
fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    let origins: Vec<HeaderValue> = match allowed_origin {
        None | Some("*") => return layer.allow_origin(Any),
        Some(list) => list
            .split(',')
            .filter_map(|origin| HeaderValue::from_str(origin.trim()).ok())
            .collect(),
    };

    if origins.is_empty() {
        tracing::warn!("ALLOWED_ORIGIN has no valid origins, allowing any");
        return layer.allow_origin(Any);
    }

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    controllers: AppControllers,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(controllers, config.allowed_origin.as_deref());

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
