// Common data models for downloader

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::extractors::RawVideoInfo;
use super::format_selector::{FormatPolicy, FormatSelector};

/// Maximum description length before truncation
pub const DESCRIPTION_LIMIT: usize = 200;

/// Containers a download may be requested in
pub const VIDEO_CONTAINERS: [&str; 4] = ["mp4", "webm", "mkv", "avi"];

/// One concrete encoded variant of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub format_id: String,
    pub ext: String,
    /// Quality label ("720p") or the extractor's format note
    pub quality: String,
    pub resolution: String,
    pub filesize: Option<u64>,
    pub fps: Option<f64>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_watermark: Option<bool>,
}

/// Normalized video metadata returned by the info endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    /// Seconds
    pub duration: f64,
    pub thumbnail: String,
    pub uploader: String,
    pub view_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    pub upload_date: String,
    pub description: String,
    pub formats: Vec<FormatDescriptor>,
}

impl VideoMetadata {
    /// Apply field defaults and the platform's format policy
    pub fn from_raw(raw: RawVideoInfo, policy: FormatPolicy) -> Self {
        let formats = FormatSelector::select_formats(&raw.formats, policy);

        Self {
            title: raw.title.unwrap_or_else(|| "Unknown Title".to_string()),
            duration: raw.duration.unwrap_or(0.0),
            thumbnail: raw.thumbnail.unwrap_or_default(),
            uploader: raw.uploader.unwrap_or_default(),
            view_count: raw.view_count.unwrap_or(0),
            like_count: raw.like_count,
            upload_date: raw.upload_date.unwrap_or_default(),
            description: truncate_description(raw.description.as_deref().unwrap_or("")),
            formats,
        }
    }
}

/// First 200 characters plus "..." for any non-empty description
pub fn truncate_description(description: &str) -> String {
    if description.is_empty() {
        return String::new();
    }
    let mut truncated: String = description.chars().take(DESCRIPTION_LIMIT).collect();
    truncated.push_str("...");
    truncated
}

/// A finished download. Dropping it removes the temp dir and the file inside.
#[derive(Debug)]
pub struct DownloadResult {
    pub file_path: PathBuf,
    pub filename: String,
    pub title: String,
    pub size: u64,
    pub temp_dir: TempDir,
}

impl DownloadResult {
    pub fn temp_dir_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Point the result at another file in the same temp dir (post-processing output)
    pub fn replace_file(&mut self, path: PathBuf) -> std::io::Result<()> {
        self.size = std::fs::metadata(&path)?.len();
        self.filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.file_path = path;
        Ok(())
    }
}

/// Download progress parsed from yt-dlp output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub percent: f32,
    pub status: String,
}
