// Downloader backend trait definition

use async_trait::async_trait;
use std::path::Path;

use super::errors::DownloadError;
use super::format_selector::FormatSelection;
use super::models::DownloadProgress;

/// Trait for downloader backend implementations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DownloaderBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Download `url` into `output_dir` as `<title>.<ext>`
    async fn download(
        &self,
        url: &str,
        selection: &FormatSelection,
        output_dir: &Path,
    ) -> Result<(), DownloadError>;
}

/// Progress reporter; logs parsed progress, throttled to whole-percent steps
pub struct ProgressLogger {
    url: String,
    last_percent: Option<u32>,
}

impl ProgressLogger {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            last_percent: None,
        }
    }

    pub fn emit(&mut self, progress: DownloadProgress) {
        let step = progress.percent.floor() as u32;
        if self.last_percent == Some(step) {
            return;
        }
        self.last_percent = Some(step);
        tracing::debug!(url = %self.url, percent = progress.percent, status = %progress.status, "download progress");
    }
}
