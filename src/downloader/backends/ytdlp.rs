// yt-dlp download backend - streams progress from a native yt-dlp child

use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::config::ExtractorConfig;
use crate::downloader::errors::DownloadError;
use crate::downloader::extractors::diagnose_error;
use crate::downloader::format_selector::FormatSelection;
use crate::downloader::models::DownloadProgress;
use crate::downloader::tools::locate_binary;
use crate::downloader::traits::{DownloaderBackend, ProgressLogger};
use crate::downloader::utils::{network_args, spawn_error};

/// Output name template inside the per-download directory
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

pub struct YtDlpBackend {
    ytdlp_bin: String,
    config: ExtractorConfig,
}

impl YtDlpBackend {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            ytdlp_bin: locate_binary("yt-dlp", config.ytdlp_path.as_deref()),
            config,
        }
    }

    fn build_args(&self, url: &str, selection: &FormatSelection, output_dir: &Path) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            selection.spec.clone(),
            "--no-playlist".to_string(),
            "--newline".to_string(),
            "--no-warnings".to_string(),
            "-P".to_string(),
            output_dir.to_string_lossy().to_string(),
            "-o".to_string(),
            OUTPUT_TEMPLATE.to_string(),
        ];

        if let Some(container) = &selection.recode_to {
            args.push("--recode-video".to_string());
            args.push(container.clone());
        }

        args.extend(network_args(&self.config));
        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl DownloaderBackend for YtDlpBackend {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn download(
        &self,
        url: &str,
        selection: &FormatSelection,
        output_dir: &Path,
    ) -> Result<(), DownloadError> {
        let args = self.build_args(url, selection, output_dir);
        tracing::info!(url, format = %selection.spec, dir = %output_dir.display(), "starting yt-dlp download");

        let mut child = Command::new(&self.ytdlp_bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&self.ytdlp_bin, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::ExecutionError("Failed to capture stdout".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::ExecutionError("Failed to capture stderr".to_string()))?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        let mut progress = ProgressLogger::new(url);
        let run = async {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                if let Some((percent, status)) = parse_ytdlp_progress(&line) {
                    progress.emit(DownloadProgress { percent, status });
                }
            }
            child.wait().await
        };

        let limit = self.config.download_timeout_secs;
        let outcome = timeout(Duration::from_secs(limit), run).await;
        let status = match outcome {
            Ok(status) => status?,
            Err(_) => {
                tracing::warn!(url, limit, "yt-dlp download timed out, killing");
                let _ = child.kill().await;
                stderr_task.abort();
                return Err(DownloadError::Timeout(limit));
            }
        };

        let stderr_output = stderr_task.await.unwrap_or_default();
        if status.success() {
            tracing::info!(url, "yt-dlp download finished");
            return Ok(());
        }

        match diagnose_error(&stderr_output) {
            Some(reason) => tracing::warn!(url, reason = reason.description(), "yt-dlp download failed"),
            None => tracing::warn!(url, stderr = %stderr_output.trim(), "yt-dlp download failed"),
        }
        Err(DownloadError::from(stderr_output))
    }
}

/// Parse a `--newline` progress line into (percent, status)
pub fn parse_ytdlp_progress(line: &str) -> Option<(f32, String)> {
    // Example: [download]  12.5% of ~ 310.04MiB at  374.36KiB/s ETA 11:59 (frag 56/454)
    lazy_static::lazy_static! {
        static ref PROGRESS_RE: Regex = Regex::new(
            r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*(\d+\.?\d*\s*\w+)(?:\s+at\s+(\S+(?:\s*\w+/s)?))?(?:\s+ETA\s+(\S+))?(?:\s+\(frag\s+(\d+)/(\d+)\))?"
        ).unwrap();
        static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").unwrap();
        static ref MERGE_RE: Regex = Regex::new(r"\[Merger?\]\s+Merging").unwrap();
        static ref CONVERT_RE: Regex = Regex::new(r"\[VideoConvertor\]\s+Converting").unwrap();
        static ref ALREADY_RE: Regex = Regex::new(r"has already been downloaded").unwrap();
    }

    if let Some(caps) = PROGRESS_RE.captures(line) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        let size = caps.get(2).map(|m| m.as_str()).unwrap_or("?");
        let speed = caps.get(3).map(|m| m.as_str()).unwrap_or("?");
        let eta = caps.get(4).map(|m| m.as_str());
        let frags = caps.get(5).zip(caps.get(6));

        let mut status = format!("{:.1}% of {} @ {}", percent, size, speed);
        if let Some(eta) = eta {
            status.push_str(&format!(" ETA {}", eta));
        }
        if let Some((current, total)) = frags {
            status.push_str(&format!(" (frag {}/{})", current.as_str(), total.as_str()));
        }
        return Some((percent, status));
    }

    if let Some(caps) = DEST_RE.captures(line) {
        let filename = caps.get(1).map(|m| m.as_str()).unwrap_or("file");
        let short_name: String = Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| filename.to_string())
            .chars()
            .take(50)
            .collect();
        return Some((0.0, format!("Starting: {}", short_name)));
    }

    if MERGE_RE.is_match(line) {
        return Some((99.0, "Merging video and audio".to_string()));
    }

    if CONVERT_RE.is_match(line) {
        return Some((99.0, "Recoding video".to_string()));
    }

    if ALREADY_RE.is_match(line) {
        return Some((100.0, "File already downloaded".to_string()));
    }

    None
}
