// Error types for the extraction and download pipeline

use thiserror::Error;

use super::extractors::diagnostics::{diagnose_error, FailureReason};

#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    /// yt-dlp binary could not be started
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool ran but exited with a non-zero status (stderr attached)
    #[error("{0}")]
    ExecutionError(String),

    /// Tool did not finish in time and was killed
    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Local filesystem failure (temp dir, directory scan)
    #[error("IO error: {0}")]
    Io(String),

    /// Info extraction failed; carries the original error text
    #[error("Failed to extract video info: {0}")]
    Extraction(String),

    /// Download failed; carries the original error text
    #[error("Download failed: {0}")]
    Download(String),
}

impl DownloadError {
    /// Wrap a lower-level failure as an info extraction failure
    pub fn extraction(source: DownloadError) -> Self {
        match source {
            Self::Extraction(_) => source,
            other => Self::Extraction(other.to_string()),
        }
    }

    /// Wrap a lower-level failure as a download failure
    pub fn download(source: DownloadError) -> Self {
        match source {
            Self::Download(_) => source,
            other => Self::Download(other.to_string()),
        }
    }

    /// Best-effort classification of the underlying tool output
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            Self::Timeout(_) => Some(FailureReason::NetworkTimeout),
            Self::ExecutionError(msg) | Self::Extraction(msg) | Self::Download(msg) => {
                diagnose_error(msg)
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// Raw stderr from a failed tool run
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        if s.contains("command not found") || s.contains("No such file or directory (os error") {
            return Self::ToolNotFound(s);
        }

        if s.contains("Invalid JSON") || s.contains("JSON parse") {
            return Self::ParseError(s);
        }

        // yt-dlp prefixes real failures with ERROR:, keep only those lines when present
        let error_lines: Vec<&str> = s
            .lines()
            .map(|l| l.trim())
            .filter(|l| l.starts_with("ERROR:"))
            .collect();

        if error_lines.is_empty() {
            Self::ExecutionError(s.trim().to_string())
        } else {
            Self::ExecutionError(error_lines.join("\n"))
        }
    }
}
