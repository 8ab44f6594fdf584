use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::provider::VoiceProvider;
use crate::infrastructure::repositories::CommentRepository;

pub struct HealthController {
    comment_repo: Arc<dyn CommentRepository>,
    provider: Arc<dyn VoiceProvider>,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub tts: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub success: bool,
    pub service: &'static str,
    pub version: &'static str,
    pub mock_mode: bool,
    pub endpoints: Vec<&'static str>,
}

impl HealthController {
    pub fn new(comment_repo: Arc<dyn CommentRepository>, provider: Arc<dyn VoiceProvider>) -> Self {
        Self {
            comment_repo,
            provider,
        }
    }

    /// GET /
    pub async fn info(State(controller): State<Arc<HealthController>>) -> Json<ServiceInfo> {
        Json(ServiceInfo {
            success: true,
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            mock_mode: controller.provider.is_mock(),
            endpoints: vec![
                "POST /api/tts",
                "POST /api/tts/:speaker",
                "GET /api/tts/speakers",
                "GET /api/comments",
                "GET /api/comments/:id",
                "GET /api/comments/:id/audio",
                "GET /api/comments/:id/audio/:speaker",
                "POST /api/comments/:id/generate-all",
                "POST /api/articles/:id/voice",
                "GET /api/articles/:id/voice/:speaker",
                "GET /health",
                "GET /health/ready",
            ],
        })
    }

    /// GET /health
    pub async fn health() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// GET /health/ready
    pub async fn health_ready(State(controller): State<Arc<HealthController>>) -> impl IntoResponse {
        let provider_health = controller.provider.health_check().await;
        let tts = provider_health.label();

        match controller.comment_repo.ping().await {
            Ok(()) => (
                StatusCode::OK,
                Json(ReadinessResponse {
                    status: "ready",
                    database: "connected",
                    tts,
                    error: None,
                }),
            ),
            Err(err) => {
                tracing::warn!(error = %err, "Readiness check failed on database");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ReadinessResponse {
                        status: "not_ready",
                        database: "disconnected",
                        tts,
                        error: Some(err.to_string()),
                    }),
                )
            }
        }
    }
}
