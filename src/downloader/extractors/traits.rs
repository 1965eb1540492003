// InfoExtractor trait and raw extractor output types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::downloader::errors::DownloadError;

/// One format entry as reported by yt-dlp, before any filtering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFormat {
    /// Format ID (e.g., "137", "play_addr")
    pub format_id: String,
    /// File extension (mp4, webm, m4a)
    pub ext: String,
    /// Format note (e.g., "1080p", "tiny")
    pub format_note: Option<String>,
    /// Resolution string (e.g., "1920x1080", "audio only")
    pub resolution: Option<String>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub fps: Option<f64>,
    /// Video codec (avc1, vp9, av01, none)
    pub vcodec: Option<String>,
    /// Audio codec (mp4a, opus, none)
    pub acodec: Option<String>,
    /// Exact file size in bytes
    pub filesize: Option<u64>,
    /// Direct media URL
    pub url: Option<String>,
}

impl RawFormat {
    /// A missing codec is not the same as "none": only an explicit "none" excludes
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some("none")
    }

    pub(crate) fn from_json(f: &serde_json::Value) -> Self {
        Self {
            format_id: f["format_id"].as_str().unwrap_or("").to_string(),
            ext: f["ext"].as_str().unwrap_or("").to_string(),
            format_note: f["format_note"].as_str().map(|s| s.to_string()),
            resolution: f["resolution"].as_str().map(|s| s.to_string()),
            width: f["width"].as_u64(),
            height: f["height"].as_u64(),
            fps: f["fps"].as_f64(),
            vcodec: f["vcodec"].as_str().map(|s| s.to_string()),
            acodec: f["acodec"].as_str().map(|s| s.to_string()),
            filesize: f["filesize"]
                .as_u64()
                .or_else(|| f["filesize"].as_f64().map(|s| s as u64)),
            url: f["url"].as_str().map(|s| s.to_string()),
        }
    }
}

/// Video info as reported by yt-dlp; every field may be absent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawVideoInfo {
    pub id: Option<String>,
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
    pub uploader: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub upload_date: Option<String>,
    pub description: Option<String>,
    pub formats: Vec<RawFormat>,
}

impl RawVideoInfo {
    /// Normalize the loosely-typed `--dump-json` document
    pub fn from_json(json: &serde_json::Value) -> Self {
        let formats = json["formats"]
            .as_array()
            .map(|list| list.iter().map(RawFormat::from_json).collect())
            .unwrap_or_default();

        Self {
            id: json["id"].as_str().map(|s| s.to_string()),
            title: json["title"].as_str().map(|s| s.to_string()),
            duration: json["duration"].as_f64(),
            thumbnail: json["thumbnail"].as_str().map(|s| s.to_string()),
            uploader: json["uploader"].as_str().map(|s| s.to_string()),
            view_count: json["view_count"].as_u64(),
            like_count: json["like_count"].as_u64(),
            upload_date: json["upload_date"].as_str().map(|s| s.to_string()),
            description: json["description"].as_str().map(|s| s.to_string()),
            formats,
        }
    }
}

/// Trait for info extractors
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InfoExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Extract video info with all formats, without downloading
    async fn extract(&self, url: &str) -> Result<RawVideoInfo, DownloadError>;
}
