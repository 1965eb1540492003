// File download endpoint: yt-dlp download, optional preset, streamed attachment

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use serde::Deserialize;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::io::ReaderStream;

use super::api::{json_body, resolve_platform};
use super::error::{AppError, Result};
use crate::downloader::models::VIDEO_CONTAINERS;
use crate::processing::apply_preset;
use crate::server::AppState;

fn default_quality() -> String {
    "best".to_string()
}

fn default_format() -> String {
    "mp4".to_string()
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_quality")]
    pub quality: String,
    /// Container of the delivered file
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub post_process: bool,
}

pub async fn download(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Response> {
    let request = json_body(payload)?;
    let (url, platform) = resolve_platform(request.url.as_deref())?;

    let container = request.format.trim().to_ascii_lowercase();
    if !VIDEO_CONTAINERS.contains(&container.as_str()) {
        return Err(AppError::Validation(format!(
            "Unsupported format '{}', expected one of: {}",
            request.format,
            VIDEO_CONTAINERS.join(", ")
        )));
    }

    let mut result = state
        .downloader
        .download(&url, &request.quality, &container)
        .await?;

    if request.post_process {
        match apply_preset(state.processor.as_ref(), platform, &result.file_path).await {
            Some(processed) => {
                if let Err(e) = result.replace_file(processed) {
                    tracing::warn!(error = %e, "processed file unreadable, sending original");
                }
            }
            None => tracing::info!(platform = platform.id(), "no post-processing applied"),
        }
    }

    state.stats.record_download();
    tracing::info!(url = %url, file = %result.filename, size = result.size, "streaming download");

    let file = tokio::fs::File::open(&result.file_path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to open downloaded file: {}", e)))?;

    // Presets and forced recodes can change the container
    let delivered_ext = delivered_extension(&result.file_path, &container);
    let attachment_name = format!("{}.{}", result.title, delivered_ext);
    let mime = mime_guess::from_ext(&delivered_ext).first_or_octet_stream();
    let body = guarded_body(file, result.temp_dir);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, result.size.to_string())
        .header(header::CONTENT_DISPOSITION, content_disposition(&attachment_name))
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}

/// Lowercased extension of the file actually sent, else the requested container
fn delivered_extension(path: &Path, requested: &str) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| requested.to_string())
}

/// Stream the file; the temp dir lives until the body is finished or dropped
fn guarded_body(file: tokio::fs::File, temp_dir: TempDir) -> Body {
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _keep_alive = &temp_dir;
        chunk
    });
    Body::from_stream(stream)
}

/// `attachment` with an ASCII fallback name plus an RFC 5987 `filename*`
pub fn content_disposition(filename: &str) -> HeaderValue {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
