// JSON API handlers: platforms, detection, info, health, stats, tools

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

use super::error::{AppError, Result};
use crate::downloader::{detect_platform, Platform, SUPPORTED_PLATFORMS};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Unwrap a JSON body, turning extractor rejections into 400s
pub fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Trimmed, non-empty http(s) URL with a host
pub fn validate_url(url: Option<&str>) -> Result<String> {
    let url = url.map(str::trim).unwrap_or("");
    if url.is_empty() {
        return Err(AppError::Validation("URL is required".to_string()));
    }

    let parsed =
        Url::parse(url).map_err(|_| AppError::Validation("Invalid URL format".to_string()))?;
    let valid_scheme = matches!(parsed.scheme(), "http" | "https");
    let has_host = parsed.host_str().is_some_and(|h| !h.is_empty());
    if !valid_scheme || !has_host {
        return Err(AppError::Validation("Invalid URL format".to_string()));
    }

    Ok(url.to_string())
}

/// Validate and detect in one step; used by every URL-taking endpoint
pub fn resolve_platform(url: Option<&str>) -> Result<(String, Platform)> {
    let url = validate_url(url)?;
    let platform = detect_platform(&url).ok_or(AppError::UnsupportedPlatform)?;
    Ok((url, platform))
}

fn platforms_map() -> Map<String, Value> {
    SUPPORTED_PLATFORMS
        .iter()
        .map(|p| (p.id().to_string(), json!(p.info())))
        .collect()
}

pub async fn platforms() -> Json<Value> {
    Json(json!({
        "success": true,
        "platforms": platforms_map(),
    }))
}

pub async fn detect(payload: std::result::Result<Json<UrlRequest>, JsonRejection>) -> Result<Json<Value>> {
    let request = json_body(payload)?;
    let (_, platform) = resolve_platform(request.url.as_deref())?;

    Ok(Json(json!({
        "success": true,
        "platform": platform,
        "platform_info": platform.info(),
    })))
}

pub async fn info(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let request = json_body(payload)?;
    let (url, platform) = resolve_platform(request.url.as_deref())?;

    let metadata = state.downloader.get_info_for(&url, Some(platform)).await?;

    let mut video_info = serde_json::to_value(&metadata)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    video_info["platform"] = json!(platform);
    video_info["platform_info"] = json!(platform.info());

    Ok(Json(json!({
        "success": true,
        "video_info": video_info,
    })))
}

pub async fn health() -> Json<Value> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(json!({
        "success": true,
        "status": "healthy",
        "timestamp": timestamp,
        "supported_platforms": SUPPORTED_PLATFORMS.len(),
    }))
}

pub async fn stats(State(state): State<AppState>) -> Json<Value> {
    let uptime = state.stats.uptime_secs();
    Json(json!({
        "success": true,
        "stats": {
            "supported_platforms": SUPPORTED_PLATFORMS.len(),
            "total_downloads": state.stats.total_downloads(),
            "uptime": format_uptime(uptime),
            "uptime_seconds": uptime,
            "version": env!("CARGO_PKG_VERSION"),
        }
    }))
}

pub async fn tools(State(state): State<AppState>) -> Result<Json<Value>> {
    let manager = state.tools.clone();
    // Version probes spawn processes synchronously
    let tools = tokio::task::spawn_blocking(move || manager.get_all_tools())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "tools": tools,
    })))
}

fn format_uptime(secs: u64) -> String {
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let (minutes, seconds) = (rem / 60, rem % 60);
    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
