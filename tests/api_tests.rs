// Router-level tests with in-process fakes for yt-dlp and ffmpeg

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use tower::ServiceExt;

use common::{harness, harness_with, FakeExtractor};

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec(), headers)
}

async fn send_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body, _) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn platforms_lists_all_seven() {
    let h = harness().await;
    let (status, body) = send_json(&h.router, get("/api/platforms")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let platforms = body["platforms"].as_object().unwrap();
    assert_eq!(platforms.len(), 7);
    assert_eq!(platforms["youtube"]["name"], "YouTube");
}

#[tokio::test]
async fn detect_known_platform() {
    let h = harness().await;
    let (status, body) = send_json(
        &h.router,
        post_json("/api/detect", json!({"url": "https://vm.tiktok.com/ZMabc/"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["platform"], "tiktok");
    assert_eq!(body["platform_info"]["name"], "TikTok");
}

#[tokio::test]
async fn detect_rejects_bad_input() {
    let h = harness().await;

    let (status, body) = send_json(&h.router, post_json("/api/detect", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "URL is required");

    let (status, body) =
        send_json(&h.router, post_json("/api/detect", json!({"url": "not a url"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid URL format");

    let (status, body) = send_json(
        &h.router,
        post_json("/api/detect", json!({"url": "https://example.com/video"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported platform");
}

#[tokio::test]
async fn detect_rejects_malformed_json() {
    let h = harness().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/detect")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send_json(&h.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn info_returns_normalized_metadata() {
    let h = harness().await;
    let (status, body) = send_json(
        &h.router,
        post_json("/api/info", json!({"url": "https://vimeo.com/12345"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let info = &body["video_info"];
    assert_eq!(info["title"], "My Clip");
    assert_eq!(info["duration"], 42.0);
    assert_eq!(info["uploader"], "someone");
    assert_eq!(info["description"], "short...");
    assert_eq!(info["platform"], "vimeo");
    assert_eq!(info["formats"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn info_failure_reports_reason() {
    let h = harness_with(
        FakeExtractor::failing("ERROR: Private video. Sign in if you've been granted access"),
        true,
    )
    .await;

    let (status, body) = send_json(
        &h.router,
        post_json("/api/info", json!({"url": "https://www.youtube.com/watch?v=x"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["reason"], "private_video");
    assert!(body["hint"].is_string());
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn download_streams_attachment() {
    let h = harness().await;
    let (status, body, headers) = send(
        &h.router,
        post_json(
            "/api/download",
            json!({"url": "https://vimeo.com/12345", "quality": "720p"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"video-bytes");
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(headers[header::CONTENT_LENGTH], "11");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment;"));
    assert!(disposition.contains("filename*=UTF-8''My%20Clip.mp4"));

    assert_eq!(h.stats.total_downloads(), 1);
    let (_, stats) = send_json(&h.router, get("/api/stats")).await;
    assert_eq!(stats["stats"]["total_downloads"], 1);
    assert_eq!(stats["stats"]["supported_platforms"], 7);
}

#[tokio::test]
async fn download_with_post_processing_sends_processed_file() {
    let h = harness().await;
    let (status, body, _) = send(
        &h.router,
        post_json(
            "/api/download",
            json!({"url": "https://www.instagram.com/reel/abc/", "post_process": true}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"processed");
}

#[tokio::test]
async fn failed_post_processing_falls_back_to_original() {
    let h = harness_with(
        FakeExtractor::titled("clip"),
        false,
    )
    .await;
    let (status, body, _) = send(
        &h.router,
        post_json(
            "/api/download",
            json!({"url": "https://www.tiktok.com/@u/video/1", "post_process": true}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"video-bytes");
}

#[tokio::test]
async fn download_rejects_unknown_container() {
    let h = harness().await;
    let (status, body) = send_json(
        &h.router,
        post_json(
            "/api/download",
            json!({"url": "https://vimeo.com/1", "format": "exe"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(h.stats.total_downloads(), 0);
    assert_eq!(h.tool_calls(), 0);
}

#[tokio::test]
async fn rejected_download_urls_never_reach_the_tools() {
    let h = harness().await;
    for payload in [
        json!({}),
        json!({"url": "not a url"}),
        json!({"url": "ftp://vimeo.com/1"}),
        json!({"url": "https://example.com/video.mp4"}),
    ] {
        let (status, body) = send_json(&h.router, post_json("/api/download", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }
    assert_eq!(h.tool_calls(), 0);

    let (status, _, _) = send(
        &h.router,
        post_json("/api/download", json!({"url": "https://vimeo.com/1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.extractor_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.backend_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn converted_download_is_labelled_by_delivered_file() {
    let h = harness().await;
    let (status, body, headers) = send(
        &h.router,
        post_json(
            "/api/download",
            json!({
                "url": "https://www.youtube.com/watch?v=x",
                "format": "webm",
                "post_process": true
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"processed");
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("filename=\"My Clip.mp4\""), "{}", disposition);
}

#[tokio::test]
async fn unprocessed_download_keeps_requested_container() {
    let h = harness().await;
    let (status, _, headers) = send(
        &h.router,
        post_json(
            "/api/download",
            json!({"url": "https://vimeo.com/1", "format": "webm"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "video/webm");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("filename=\"My Clip.webm\""), "{}", disposition);
}

#[tokio::test]
async fn tiktok_recode_is_labelled_mp4() {
    let h = harness().await;
    let (status, _, headers) = send(
        &h.router,
        post_json(
            "/api/download",
            json!({"url": "https://www.tiktok.com/@u/video/1", "format": "mkv"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("filename=\"My Clip.mp4\""), "{}", disposition);
}

#[tokio::test]
async fn health_reports_platform_count() {
    let h = harness().await;
    let (status, body) = send_json(&h.router, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["supported_platforms"], 7);
    assert!(body["timestamp"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn users_create_and_list() {
    let h = harness().await;

    let (status, created) = send_json(
        &h.router,
        post_json("/users", json!({"username": "alice", "email": "alice@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["username"], "alice");
    assert!(created["id"].as_i64().unwrap() > 0);
    assert!(created["created_at"].is_string());

    let (status, body) = send_json(
        &h.router,
        post_json("/users", json!({"username": "alice", "email": "other@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User already exists");

    let (status, body) = send_json(&h.router, post_json("/users", json!({"username": "bob"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing username or email");

    let (status, users) = send_json(&h.router, get("/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["email"], "alice@example.com");
}
