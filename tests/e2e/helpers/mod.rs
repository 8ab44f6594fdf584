use chrono::{Duration as ChronoDuration, Utc};
use judge_voice_backend::controllers::{
    articles::ArticleController, comments::CommentController, health::HealthController,
    tts::TtsController,
};
use judge_voice_backend::domain::article::{Article, ArticleVoiceService};
use judge_voice_backend::domain::comment::{Comment, CommentService};
use judge_voice_backend::domain::voice::{
    AudioCache, Pacing, Speaker, VoiceMap, VoiceService, WarmupService,
};
use judge_voice_backend::infrastructure::http::{build_router, AppControllers};
use judge_voice_backend::infrastructure::provider::{PpioClient, ProviderSettings, VoiceProvider};
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use uuid::Uuid;

pub mod api_client;

use api_client::TestClient;
use fakes::{StubTransport, REJECT_MARKER};
use judge_voice_backend::testing::{
    InMemoryArticleRepository, InMemoryCommentRepository, InMemoryGenerationRepository,
    RecordingStorage,
};

pub const MOCK_AUDIO_URL: &str = "https://samples.test/mock.wav";

/// Ids of the seeded rows
pub struct TestFixtures {
    /// All four judges wrote in both languages
    pub complete_comment: Uuid,
    /// Only Wu Enda and Sam Altman wrote, English only
    pub partial_comment: Uuid,
    /// Paul Graham's English text is refused by the provider
    pub rejected_comment: Uuid,
    /// Short English article
    pub short_article: i64,
    /// Article long enough to need several segments
    pub long_article: i64,
}

pub struct TestContext {
    pub client: TestClient,
    pub fixtures: TestFixtures,
    pub transport: Arc<StubTransport>,
    pub storage: Arc<RecordingStorage>,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async { TestContext::start(false).await }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {}
    }
}

/// Same application with the provider in mock mode
pub struct MockModeContext(pub TestContext);

impl AsyncTestContext for MockModeContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async { MockModeContext(TestContext::start(true).await) }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {}
    }
}

impl TestContext {
    async fn start(mock_mode: bool) -> Self {
        let (comments, articles, fixtures) = seed();

        let voices = Speaker::ALL.iter().fold(VoiceMap::new(), |voices, speaker| {
            voices.with_voice(*speaker, format!("voice-{}", speaker))
        });
        let settings = ProviderSettings {
            max_retries: 1,
            backoff_unit: Duration::ZERO,
            mock_mode,
            mock_audio_url: MOCK_AUDIO_URL.to_string(),
            mock_delay: Duration::ZERO,
            ..ProviderSettings::default()
        };

        let transport = Arc::new(StubTransport::default());
        let storage = Arc::new(RecordingStorage::default());
        let provider: Arc<dyn VoiceProvider> =
            Arc::new(PpioClient::new(transport.clone(), voices, settings));

        let comment_repo = Arc::new(InMemoryCommentRepository::with(comments));
        let article_repo = Arc::new(InMemoryArticleRepository::with(articles));
        let generation_repo = Arc::new(InMemoryGenerationRepository::default());

        let pacing = Pacing::none();
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
            storage.clone(),
            cache.in_flight().clone(),
            pacing.between_chunks,
        ));

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

        let app = build_router(controllers, None);

        // Start server
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            client: TestClient::new(&base_url),
            fixtures,
            transport,
            storage,
        }
    }
}

fn seed() -> (Vec<Comment>, Vec<Article>, TestFixtures) {
    let now = Utc::now();
    let text = |s: &str| Some(s.to_string());

    let complete = Comment {
        id: Uuid::new_v4(),
        gmail: text("builder@example.com"),
        github_repo_url: text("https://github.com/example/agent-arena"),
        created_at: now,
        comment_en_ng: text("Solid use of retrieval. Consider evaluating on a held-out set."),
        comment_en_paul: text("The demo is charming. Talk to users before adding features."),
        comment_en_li: text("Thoughtful framing of the human impact."),
        comment_en_sam: text("Ship it and iterate fast."),
        comment_cn_ng: text("检索用得很扎实。"),
        comment_cn_paul: text("演示很有魅力。"),
        comment_cn_li: text("对人类影响的思考很深入。"),
        comment_cn_sam: text("尽快发布并快速迭代。"),
    };

    let partial = Comment {
        id: Uuid::new_v4(),
        gmail: text("solo@example.com"),
        github_repo_url: None,
        created_at: now - ChronoDuration::minutes(5),
        comment_en_ng: text("Nice baseline."),
        comment_en_paul: text("   "),
        comment_en_li: None,
        comment_en_sam: text("Keep going."),
        comment_cn_ng: None,
        comment_cn_paul: None,
        comment_cn_li: None,
        comment_cn_sam: None,
    };

    let rejected = Comment {
        id: Uuid::new_v4(),
        gmail: text("edge@example.com"),
        github_repo_url: text("https://github.com/example/edge-cases"),
        created_at: now - ChronoDuration::minutes(10),
        comment_en_ng: text("Clear write-up."),
        comment_en_paul: Some(format!("{} Too many buzzwords.", REJECT_MARKER)),
        comment_en_li: text("Good dataset hygiene."),
        comment_en_sam: text("Bigger ambition please."),
        comment_cn_ng: None,
        comment_cn_paul: None,
        comment_cn_li: None,
        comment_cn_sam: None,
    };

    let short_article = Article {
        id: 1,
        title: text("Welcome"),
        content: "Welcome to the hackathon. Judges will read every submission.".to_string(),
        language: text("en"),
        created_at: now,
    };

    let long_article = Article {
        id: 2,
        title: text("Judging rubric"),
        content: "Each project is scored on originality, execution and impact. ".repeat(20),
        language: None,
        created_at: now,
    };

    let fixtures = TestFixtures {
        complete_comment: complete.id,
        partial_comment: partial.id,
        rejected_comment: rejected.id,
        short_article: short_article.id,
        long_article: long_article.id,
    };

    (
        vec![complete, partial, rejected],
        vec![short_article, long_article],
        fixtures,
    )
}
