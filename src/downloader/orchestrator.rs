// Orchestrator - info extraction and downloads into per-call temp dirs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::errors::DownloadError;
use super::extractors::InfoExtractor;
use super::format_selector::{FormatPolicy, FormatSelection};
use super::models::{DownloadResult, VideoMetadata, VIDEO_CONTAINERS};
use super::platforms::{detect_platform, Platform};
use super::traits::DownloaderBackend;

/// Prefix for per-download temp dirs
const TEMP_PREFIX: &str = "social-dl-";

pub struct Downloader {
    extractor: Arc<dyn InfoExtractor>,
    backend: Arc<dyn DownloaderBackend>,
    temp_root: Option<PathBuf>,
}

impl Downloader {
    pub fn new(extractor: Arc<dyn InfoExtractor>, backend: Arc<dyn DownloaderBackend>) -> Self {
        Self {
            extractor,
            backend,
            temp_root: None,
        }
    }

    /// Create temp dirs under `root` instead of the system temp dir
    pub fn with_temp_root(mut self, root: Option<PathBuf>) -> Self {
        self.temp_root = root;
        self
    }

    /// Fetch and normalize metadata using the platform's format policy.
    /// Unknown platforms fall back to the plain video policy.
    pub async fn get_info(&self, url: &str) -> Result<VideoMetadata, DownloadError> {
        let platform = detect_platform(url);
        self.get_info_for(url, platform).await
    }

    pub async fn get_info_for(
        &self,
        url: &str,
        platform: Option<Platform>,
    ) -> Result<VideoMetadata, DownloadError> {
        tracing::debug!(url, extractor = self.extractor.name(), "fetching video info");
        let raw = self
            .extractor
            .extract(url)
            .await
            .map_err(DownloadError::extraction)?;

        let policy = platform
            .map(Platform::format_policy)
            .unwrap_or(FormatPolicy::AllVideo);
        Ok(VideoMetadata::from_raw(raw, policy))
    }

    /// Download into a fresh temp dir. The returned result owns the dir.
    pub async fn download(
        &self,
        url: &str,
        quality: &str,
        container: &str,
    ) -> Result<DownloadResult, DownloadError> {
        let temp_dir = self.create_temp_dir().map_err(DownloadError::download)?;
        tracing::debug!(url, dir = %temp_dir.path().display(), "created download dir");

        let title = self
            .extractor
            .extract(url)
            .await
            .map_err(DownloadError::download)?
            .title
            .unwrap_or_else(|| "video".to_string());

        let selection = match detect_platform(url) {
            Some(platform) => platform.format_selection(quality, container),
            None => FormatSelection::for_request(quality, container),
        };

        tracing::info!(url, backend = self.backend.name(), format = %selection.spec, "downloading");
        self.backend
            .download(url, &selection, temp_dir.path())
            .await
            .map_err(DownloadError::download)?;

        let file_path = find_video_file(temp_dir.path())
            .map_err(DownloadError::download)?
            .ok_or_else(|| DownloadError::Download("No video file found after download".to_string()))?;

        let size = std::fs::metadata(&file_path)
            .map_err(|e| DownloadError::download(e.into()))?
            .len();
        let filename = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        tracing::info!(url, file = %filename, size, "download complete");
        Ok(DownloadResult {
            file_path,
            filename,
            title,
            size,
            temp_dir,
        })
    }

    fn create_temp_dir(&self) -> Result<tempfile::TempDir, DownloadError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX);
        let dir = match &self.temp_root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }
}

/// First file (by name) with a known video container extension
pub fn find_video_file(dir: &Path) -> Result<Option<PathBuf>, DownloadError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    entries.sort();

    Ok(entries.into_iter().find(|path| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| VIDEO_CONTAINERS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }))
}
