use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_context::test_context;

fn strings(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap())
        .collect()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_comments_newest_first(ctx: &TestContext) {
    let response = ctx.client.get("/api/comments").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["success"], true);
    assert_eq!(
        body["pagination"],
        json!({ "page": 1, "limit": 10, "total": 3, "totalPages": 1 })
    );

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["id"], ctx.fixtures.complete_comment.to_string());
    assert_eq!(data[2]["id"], ctx.fixtures.rejected_comment.to_string());
    assert_eq!(data[0]["hasAudio"]["wuenda"], false);
    assert_eq!(data[0]["textPreviews"]["sam_altman"]["hasText"], true);
    assert_eq!(data[0]["textPreviews"]["sam_altman"]["preview"], "Ship it and iterate fast.");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_paginate_and_fall_back_on_bad_numbers(ctx: &TestContext) {
    let response = ctx.client.get("/api/comments?page=2&limit=2").await.unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["data"][0]["id"], ctx.fixtures.rejected_comment.to_string());

    let response = ctx.client.get("/api/comments?page=abc&limit=xyz").await.unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body()["pagination"]["page"], 1);
    assert_eq!(response.body()["pagination"]["limit"], 10);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_page_beyond_offset_range(ctx: &TestContext) {
    let response = ctx
        .client
        .get(&format!("/api/comments?page={}", i64::MAX))
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("page out of range");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_search_comments(ctx: &TestContext) {
    let response = ctx.client.get("/api/comments?search=SOLO").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["query"], "SOLO");
    assert_eq!(body["data"][0]["id"], ctx.fixtures.partial_comment.to_string());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_comment_with_stats(ctx: &TestContext) {
    let path = format!("/api/comments/{}", ctx.fixtures.partial_comment);
    let response = ctx.client.get(&path).await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["data"]["gmail"], "solo@example.com");
    assert_eq!(body["stats"]["english"]["wuenda"]["length"], 14);
    assert_eq!(body["stats"]["english"]["paul_graham"]["hasText"], false);
    assert_eq!(body["stats"]["chinese"]["wuenda"]["hasText"], false);
    // "Nice baseline." + "   " + "Keep going."
    assert_eq!(body["stats"]["total_characters"], 28);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_validate_comment_ids(ctx: &TestContext) {
    let response = ctx.client.get("/api/comments/not-a-uuid").await.unwrap();
    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Invalid comment id format");

    let path = format!("/api/comments/{}", uuid::Uuid::new_v4());
    let response = ctx.client.get(&path).await.unwrap();
    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("Comment not found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_every_judge_in_order(ctx: &TestContext) {
    let path = format!("/api/comments/{}/generate-all", ctx.fixtures.complete_comment);
    let response = ctx.client.post_empty(&path).await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["success"], true);
    assert_eq!(body["language"], "en");
    assert_eq!(
        strings(&body["generated"]),
        vec!["wuenda", "paul_graham", "feifeili", "sam_altman"]
    );
    assert_eq!(
        body["statistics"],
        json!({ "total": 4, "generated": 4, "failed": 0, "skipped": 0 })
    );
    assert_eq!(
        body["message"],
        "English audio generation finished: 4 generated, 0 failed, 0 skipped"
    );
    assert_eq!(
        body["audios"]["wuenda"]["audioUrl"],
        "https://cdn.test/voice-wuenda/1.mp3"
    );

    let voices: Vec<String> = ctx
        .transport
        .requests()
        .into_iter()
        .map(|r| r.voice_id)
        .collect();
    assert_eq!(
        voices,
        vec!["voice-wuenda", "voice-paul_graham", "voice-feifeili", "voice-sam_altman"]
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_skip_judges_without_text(ctx: &TestContext) {
    let path = format!("/api/comments/{}/generate-all", ctx.fixtures.partial_comment);
    let response = ctx.client.post_empty(&path).await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(strings(&body["generated"]), vec!["wuenda", "sam_altman"]);
    assert_eq!(strings(&body["skipped"]), vec!["paul_graham", "feifeili"]);
    assert_eq!(ctx.transport.requests().len(), 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_continue_batch_after_a_judge_fails(ctx: &TestContext) {
    let path = format!("/api/comments/{}/generate-all", ctx.fixtures.rejected_comment);
    let response = ctx.client.post_empty(&path).await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["success"], true);
    assert_eq!(strings(&body["generated"]), vec!["wuenda", "feifeili", "sam_altman"]);

    let failed = body["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["speaker"], "paul_graham");
    assert_eq!(failed[0]["language"], "en");
    assert!(failed[0]["error"].as_str().unwrap().contains("rejected"));
    assert!(body["audios"].get("paul_graham").is_none());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_chinese_audio_on_request(ctx: &TestContext) {
    let path = format!("/api/comments/{}/generate-all?lang=cn", ctx.fixtures.complete_comment);
    let response = ctx.client.post_empty(&path).await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body["language"], "cn");
    assert_eq!(
        body["message"],
        "Chinese audio generation finished: 4 generated, 0 failed, 0 skipped"
    );
    assert_eq!(ctx.transport.requests()[0].text, "检索用得很扎实。");

    let response = ctx
        .client
        .post_empty(&format!("/api/comments/{}/generate-all?lang=fr", ctx.fixtures.complete_comment))
        .await
        .unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reuse_cached_audio_on_repeat_batches(ctx: &TestContext) {
    let path = format!("/api/comments/{}/generate-all", ctx.fixtures.complete_comment);

    let first = ctx.client.post_empty(&path).await.unwrap();
    first.assert_status(StatusCode::OK);
    let second = ctx.client.post_empty(&path).await.unwrap();
    second.assert_status(StatusCode::OK);

    assert_eq!(ctx.transport.requests().len(), 4);
    assert_eq!(second.body()["statistics"]["generated"], 4);
    assert_eq!(first.body()["audios"], second.body()["audios"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_when_batching_unknown_comment(ctx: &TestContext) {
    let path = format!("/api/comments/{}/generate-all", uuid::Uuid::new_v4());
    let response = ctx.client.post_empty(&path).await.unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("comment");
    assert!(ctx.transport.requests().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_cached_and_missing_audio(ctx: &TestContext) {
    let path = format!("/api/comments/{}/audio", ctx.fixtures.partial_comment);

    let before = ctx.client.get(&path).await.unwrap();
    before.assert_status(StatusCode::OK);
    assert_eq!(before.body()["statistics"]["available"], 0);
    assert_eq!(
        strings(&before.body()["statistics"]["missingSpeakers"]),
        vec!["wuenda", "sam_altman"]
    );

    ctx.client
        .get(&format!("/api/comments/{}/audio/wuenda", ctx.fixtures.partial_comment))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let after = ctx.client.get(&path).await.unwrap();
    let body = after.body();
    assert_eq!(body["commentId"], ctx.fixtures.partial_comment.to_string());
    assert_eq!(body["metadata"]["gmail"], "solo@example.com");
    assert_eq!(body["statistics"]["available"], 1);
    assert_eq!(strings(&body["statistics"]["availableSpeakers"]), vec!["wuenda"]);
    assert_eq!(strings(&body["statistics"]["missingSpeakers"]), vec!["sam_altman"]);
    assert_eq!(body["audios"]["wuenda"]["text"], "Nice baseline.");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_single_speaker_once(ctx: &TestContext) {
    let path = format!("/api/comments/{}/audio/paul-graham", ctx.fixtures.complete_comment);

    let first = ctx.client.get(&path).await.unwrap();
    first.assert_status(StatusCode::OK);

    let body = first.body();
    assert_eq!(body["success"], true);
    assert_eq!(body["speaker"], "paul_graham");
    assert_eq!(body["language"], "en");
    assert_eq!(body["commentId"], ctx.fixtures.complete_comment.to_string());

    let second = ctx.client.get(&path).await.unwrap();
    second.assert_status(StatusCode::OK);
    assert_eq!(second.body()["audioUrl"], body["audioUrl"]);
    assert_eq!(ctx.transport.requests().len(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_judge_without_text(ctx: &TestContext) {
    let path = format!("/api/comments/{}/audio/feifeili", ctx.fixtures.partial_comment);
    let response = ctx.client.get(&path).await.unwrap();

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("feifeili has no en text");

    let path = format!("/api/comments/{}/audio/wuenda?lang=cn", ctx.fixtures.partial_comment);
    let response = ctx.client.get(&path).await.unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(ctx.transport.requests().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_mark_audio_in_listing_after_generation(ctx: &TestContext) {
    let path = format!("/api/comments/{}/generate-all", ctx.fixtures.complete_comment);
    ctx.client.post_empty(&path).await.unwrap().assert_status(StatusCode::OK);

    let response = ctx.client.get("/api/comments?limit=1").await.unwrap();
    let has_audio = &response.body()["data"][0]["hasAudio"];

    assert_eq!(
        *has_audio,
        json!({ "sam_altman": true, "feifeili": true, "wuenda": true, "paul_graham": true })
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_clear_one_comment_cache(ctx: &TestContext) {
    for comment in [ctx.fixtures.complete_comment, ctx.fixtures.partial_comment] {
        let path = format!("/api/comments/{}/generate-all", comment);
        ctx.client.post_empty(&path).await.unwrap().assert_status(StatusCode::OK);
    }

    let path = format!("/api/comments/{}/cache", ctx.fixtures.complete_comment);
    let response = ctx.client.delete(&path).await.unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body();
    assert_eq!(body["clearedCount"], 4);
    assert_eq!(body["commentId"], ctx.fixtures.complete_comment.to_string());

    let stats = ctx.client.get("/api/comments/cache/stats").await.unwrap();
    assert_eq!(stats.body()["cache"]["totalCached"], 2);

    // Regenerating after invalidation calls the provider again
    let path = format!("/api/comments/{}/audio/wuenda", ctx.fixtures.complete_comment);
    ctx.client.get(&path).await.unwrap().assert_status(StatusCode::OK);
    assert_eq!(ctx.transport.requests().len(), 7);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_clear_whole_cache_and_report_stats(ctx: &TestContext) {
    let path = format!("/api/comments/{}/generate-all", ctx.fixtures.partial_comment);
    ctx.client.post_empty(&path).await.unwrap().assert_status(StatusCode::OK);

    let stats = ctx.client.get("/api/comments/cache/stats").await.unwrap();
    stats.assert_status(StatusCode::OK);

    let cache = &stats.body()["cache"];
    assert_eq!(cache["totalCached"], 2);
    assert_eq!(cache["activeGenerations"], 0);
    let keys = strings(&cache["cacheKeys"]);
    assert!(keys.contains(&format!("{}_wuenda_en", ctx.fixtures.partial_comment).as_str()));

    let response = ctx.client.delete("/api/comments/cache").await.unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body()["clearedCount"], 2);
    assert!(response.body().get("commentId").is_none());

    let stats = ctx.client.get("/api/comments/cache/stats").await.unwrap();
    assert_eq!(stats.body()["cache"]["totalCached"], 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_warm_up_recent_comments(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/comments/cache/warmup", &json!({ "limit": 2 }))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["commentId"], ctx.fixtures.complete_comment.to_string());
    assert_eq!(results[0]["generated"], 4);
    assert_eq!(results[1]["commentId"], ctx.fixtures.partial_comment.to_string());
    assert_eq!(results[1]["generated"], 2);
    assert_eq!(body["message"], "Cache warmup finished, processed 2 comments");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_warm_up_with_default_limit_without_body(ctx: &TestContext) {
    let response = ctx.client.post_empty("/api/comments/cache/warmup").await.unwrap();

    response.assert_status(StatusCode::OK);

    let results = response.body()["results"].as_array().unwrap().clone();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r["success"] == true));
    assert_eq!(results[2]["generated"], 3);

    let stats = ctx.client.get("/api/comments/cache/stats").await.unwrap();
    assert_eq!(stats.body()["cache"]["totalCached"], 9);
}
