use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use judge_voice_backend::controllers::{
    articles::ArticleController, comments::CommentController, health::HealthController, tts::TtsController,
};
use judge_voice_backend::domain::article::ArticleVoiceService;
use judge_voice_backend::domain::comment::CommentService;
use judge_voice_backend::domain::voice::{AudioCache, VoiceService, WarmupService};
use judge_voice_backend::infrastructure::config::{Config, LogFormat};
use judge_voice_backend::infrastructure::db::{check_connection, create_pool};
use judge_voice_backend::infrastructure::http::{start_http_server, AppControllers};
use judge_voice_backend::infrastructure::provider::{HttpSpeechTransport, PpioClient, VoiceProvider};
use judge_voice_backend::infrastructure::repositories::{
    PgArticleRepository, PgCommentRepository, PgGenerationRepository,
};
use judge_voice_backend::infrastructure::storage::SupabaseStorage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        environment = ?config.environment,
        "Starting Judge Voice Backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url, config.db_max_connections)?;
    match check_connection(&pool).await {
        Ok(()) => tracing::info!("Database connection verified"),
        Err(err) => tracing::warn!(error = %err, "Database not reachable yet, readiness will report it"),
    }

    tracing::info!(
        mock_mode = config.is_mock_mode(),
        configured_voices = config.voices.speakers().len(),
        api_url = %config.ppio_api_url,
        "Voice provider configuration loaded"
    );

    let pool = Arc::new(pool);
    let pacing = config.pacing();

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Repositories and external clients
    tracing::info!("Instantiating repositories...");
    let comment_repo = Arc::new(PgCommentRepository::new(pool.clone()));
    let article_repo = Arc::new(PgArticleRepository::new(pool.clone()));
    let generation_repo = Arc::new(PgGenerationRepository::new(pool.clone()));

    let transport = Arc::new(HttpSpeechTransport::new(
        config.ppio_api_url.clone(),
        config.ppio_api_token.clone().unwrap_or_default(),
        config.provider_timeout(),
    )?);
    let provider: Arc<dyn VoiceProvider> = Arc::new(PpioClient::new(
        transport,
        config.voices.clone(),
        config.provider_settings(),
    ));
    let storage = Arc::new(SupabaseStorage::new(
        config.supabase_url.clone(),
        config.supabase_service_role_key.clone(),
        config.storage_bucket.clone(),
    )?);

    // 2. Services
    tracing::info!("Instantiating services...");
    let cache = AudioCache::new();
    let comment_service = Arc::new(CommentService::new(comment_repo.clone(), cache.clone()));
    let voice_service = Arc::new(VoiceService::new(
        comment_repo.clone(),
        provider.clone(),
        cache.clone(),
        pacing,
    ));
    let warmup_service = Arc::new(WarmupService::new(
        comment_repo.clone(),
        voice_service.clone(),
        pacing.between_subjects,
    ));
    let article_service = Arc::new(ArticleVoiceService::new(
        article_repo,
        generation_repo,
        provider.clone(),
        storage,
        cache.in_flight().clone(),
        pacing.between_chunks,
    ));

    // 3. Controllers
    tracing::info!("Instantiating controllers...");
    let controllers = AppControllers {
        health: Arc::new(HealthController::new(comment_repo, provider.clone())),
        tts: Arc::new(TtsController::new(provider, article_service.clone())),
        comments: Arc::new(CommentController::new(
            comment_service,
            voice_service,
            warmup_service,
        )),
        articles: Arc::new(ArticleController::new(article_service)),
    };

    // Start HTTP server with all routes
    start_http_server(Arc::new(config), controllers).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "judge_voice_backend=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
