use crate::e2e::helpers;

use helpers::{MockModeContext, TestContext, MOCK_AUDIO_URL};
use hyper::StatusCode;
use judge_voice_backend::controllers::tts::TtsResponse;
use judge_voice_backend::domain::voice::Speaker;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_synthesize_inline_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/tts",
            &json!({ "text": "Great project,   well done.", "speaker": "wuenda" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let tts: TtsResponse = response.json().unwrap();
    assert!(tts.success);
    assert!(!tts.mock);
    assert_eq!(tts.speaker, Speaker::WuEnda);
    assert_eq!(tts.voice_id, "voice-wuenda");
    assert_eq!(tts.audio_url, "https://cdn.test/voice-wuenda/1.mp3");
    assert_eq!(tts.text_preview, "Great project, well done.");

    // Whitespace is collapsed before the provider sees the text
    let requests = ctx.transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].text, "Great project, well done.");
    assert_eq!(requests[0].voice_id, "voice-wuenda");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_synthesize_stored_article_by_numeric_text_id(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/tts",
            &json!({ "textId": ctx.fixtures.short_article, "speaker": "sam_altman" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body()["speaker"], "sam_altman");

    let requests = ctx.transport.requests();
    assert_eq!(
        requests[0].text,
        "Welcome to the hackathon. Judges will read every submission."
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_accept_text_id_as_string(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "textId": "1", "speaker": "feifeili" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body()["voiceId"], "voice-feifeili");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_truncate_long_text_for_the_provider(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "textId": ctx.fixtures.long_article, "speaker": "wuenda" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let requests = ctx.transport.requests();
    let sent = &requests[0].text;
    assert!(sent.chars().count() <= 500);
    assert!(sent.ends_with('.'));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_missing_speaker(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "text": "Hello" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Missing required parameter: speaker");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_speaker(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "text": "Hello", "speaker": "elon" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Unsupported speaker: elon");
    assert!(ctx.transport.requests().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_exactly_one_text_source(ctx: &TestContext) {
    let both = ctx
        .client
        .post(
            "/api/tts",
            &json!({ "textId": 1, "text": "Hello", "speaker": "wuenda" }),
        )
        .await
        .unwrap();
    both.assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("either textId or text");

    let neither = ctx
        .client
        .post("/api/tts", &json!({ "speaker": "wuenda" }))
        .await
        .unwrap();
    neither
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("One of textId or text is required");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_unknown_article(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "textId": 999, "speaker": "wuenda" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("article 999");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_blank_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts", &json!({ "text": "   \n ", "speaker": "wuenda" }))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("text cannot be empty");
    assert!(ctx.transport.requests().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_map_provider_rejection_to_bad_gateway(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/tts",
            &json!({ "text": "[reject] not today", "speaker": "paul_graham" }),
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_GATEWAY)
        .assert_error_message("voice provider rejected the request");

    // Rejections are not retried
    assert_eq!(ctx.transport.requests().len(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_take_speaker_from_path(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/tts/paul-graham", &json!({ "text": "Make something people want." }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body()["speaker"], "paul_graham");

    let missing = ctx
        .client
        .post("/api/tts/paul-graham", &json!({}))
        .await
        .unwrap();
    missing
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Missing required parameter: text");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_configured_speakers(ctx: &TestContext) {
    let response = ctx.client.get("/api/tts/speakers").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["total"], 4);
    let names: Vec<&str> = body["speakers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["sam_altman", "feifeili", "wuenda", "paul_graham"]);
    assert_eq!(body["speakers"][3]["displayName"], "Paul Graham");
}

#[test_context(MockModeContext)]
#[tokio::test]
async fn it_should_return_sample_audio_in_mock_mode(ctx: &MockModeContext) {
    let response = ctx
        .0
        .client
        .post("/api/tts", &json!({ "text": "Hello judges.", "speaker": "wuenda" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let tts: TtsResponse = response.json().unwrap();
    assert!(tts.mock);
    assert_eq!(tts.audio_url, MOCK_AUDIO_URL);
    assert_eq!(tts.voice_id, "voice-wuenda");
    assert!(ctx.0.transport.requests().is_empty());
}
