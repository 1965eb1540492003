// CLI InfoExtractor - runs the native `yt-dlp` binary in info-only mode

use async_trait::async_trait;

use super::traits::{InfoExtractor, RawVideoInfo};
use crate::config::ExtractorConfig;
use crate::downloader::errors::DownloadError;
use crate::downloader::tools::locate_binary;
use crate::downloader::utils::{network_args, run_output_with_timeout};

/// CLI-based info extractor using yt-dlp binary
pub struct CliInfoExtractor {
    ytdlp_path: String,
    config: ExtractorConfig,
}

impl CliInfoExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            ytdlp_path: locate_binary("yt-dlp", config.ytdlp_path.as_deref()),
            config,
        }
    }

    pub fn ytdlp_path(&self) -> &str {
        &self.ytdlp_path
    }

    /// Build command arguments
    fn build_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
        ];
        args.extend(network_args(&self.config));
        args.push(url.to_string());
        args
    }

    fn parse_json(stdout: &[u8]) -> Result<RawVideoInfo, DownloadError> {
        let json_str = String::from_utf8_lossy(stdout);
        let json: serde_json::Value = serde_json::from_str(&json_str)
            .map_err(|e| DownloadError::ParseError(format!("Invalid JSON: {}", e)))?;

        if !json.is_object() {
            return Err(DownloadError::ParseError(
                "Expected a JSON object from yt-dlp".to_string(),
            ));
        }

        Ok(RawVideoInfo::from_json(&json))
    }
}

#[async_trait]
impl InfoExtractor for CliInfoExtractor {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    async fn extract(&self, url: &str) -> Result<RawVideoInfo, DownloadError> {
        let args = self.build_args(url);
        tracing::debug!(program = %self.ytdlp_path, args = %args.join(" "), "extracting info");

        let output =
            run_output_with_timeout(&self.ytdlp_path, &args, self.config.info_timeout_secs)
                .await
                .map_err(DownloadError::extraction)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(url, stderr = %stderr.trim(), "yt-dlp info failed");
            return Err(DownloadError::extraction(DownloadError::from(
                stderr.to_string(),
            )));
        }

        Self::parse_json(&output.stdout).map_err(DownloadError::extraction)
    }
}
